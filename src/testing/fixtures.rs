//! Curated Jsonnet sources for tests
//!
//! Fixtures live in `testdata/` at the workspace root:
//!
//! ```text
//! testdata/
//! ├── *.libsonnet            documented (or deliberately broken) packages
//! └── vendor/                search path the fixtures import libraries from
//! ```
//!
//! Anything loaded through [`Fixtures`] gets `testdata/vendor` as its only search path.

use crate::error::Error;
use crate::extract::Opts;
use crate::model::Package;
use std::path::{Path, PathBuf};

pub struct Fixtures;

impl Fixtures {
    pub fn root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata")
    }

    /// Absolute path of fixture `name`; panics if it doesn't exist.
    pub fn path(name: &str) -> PathBuf {
        let path = Self::root().join(name);
        assert!(path.exists(), "fixture {} not found at {}", name, path.display());
        path
    }

    pub fn vendor() -> PathBuf {
        Self::root().join("vendor")
    }

    pub fn opts() -> Opts {
        Opts::new().jpath(Self::vendor())
    }

    pub fn source(name: &str) -> String {
        std::fs::read_to_string(Self::path(name))
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", name, e))
    }

    pub fn extract(name: &str) -> Result<Vec<u8>, Error> {
        crate::extract::extract(Self::path(name), &Self::opts())
    }

    pub fn load(name: &str) -> Result<Package, Error> {
        crate::load(Self::path(name), &Self::opts())
    }
}
