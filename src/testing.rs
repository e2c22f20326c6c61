//! Testing utilities
//!
//! Docsonnet tests should not hand-write Jsonnet inline where a fixture will do. Jsonnet that
//! looks right but uses doc-util slightly wrong produces a model that looks right too, and
//! the test then checks the wrong thing. So:
//!
//!     1. Load curated sources from `testdata/` via [Fixtures](fixtures::Fixtures)
//!     2. Check the resulting model with [assert_package](fn@assert_package)
//!
//! ```rust,ignore
//! use docsonnet::testing::{assert_package, fixtures::Fixtures};
//!
//! let pkg = Fixtures::load("empty.libsonnet").unwrap();
//! assert_package(&pkg).name("empty").field_count(0);
//! ```
//!
//! Transform tests are the exception: they feed JSON straight in, since the bootstrap output
//! is exactly what they exercise.

mod assertions;
pub mod fixtures;

pub use assertions::{
    assert_package, ArgumentAssertion, FieldsAssertion, FunctionAssertion, ObjectAssertion,
    PackageAssertion, ValueAssertion,
};
