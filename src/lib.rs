//! # docsonnet
//!
//! Reads the structured documentation ("docsonnet") embedded in Jsonnet libraries and turns it
//! into a typed [`Package`].
//!
//! Loading runs in two stages:
//!
//!     1. [`extract`]: evaluate the file with the bundled `doc-util` library importable, and
//!        keep only the documentation sub-tree, as JSON
//!     2. [`transform`]: rebuild that JSON into the [`model`]
//!
//! [`load`] does both. Each call is self-contained; concurrent calls share nothing.
//!
//! ```rust,ignore
//! use docsonnet::{load, Opts};
//!
//! let pkg = load("main.libsonnet", &Opts::new().jpath("vendor"))?;
//! for field in &pkg.api {
//!     println!("{}: {}", field.name(), field.help());
//! }
//! ```
//!
//! For testing guidelines see the [testing module](testing).

pub mod bundle;
pub mod error;
pub mod extract;
pub mod import;
pub mod loader;
pub mod model;
pub mod testing;
pub mod transform;

pub use error::{Error, StructureError};
pub use extract::{extract, Opts};
pub use loader::load;
pub use model::{Field, Package};
pub use transform::transform;
