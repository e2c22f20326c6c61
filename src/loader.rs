//! One-call entry point: extract, then transform

use crate::error::Error;
use crate::extract::{extract, Opts};
use crate::model::Package;
use crate::transform::transform;
use std::path::Path;

/// Extracts and transforms the docsonnet data in `filename`, returning its top level package.
///
/// Errors from either stage come back unchanged; a partially built package is never
/// returned.
pub fn load(filename: impl AsRef<Path>, opts: &Opts) -> Result<Package, Error> {
    let data = extract(filename, opts)?;
    transform(&data)
}
