//! Jsonnet payloads compiled into the binary
//!
//! Two programs ship with every build and are never read from disk:
//!
//! - [`BOOTSTRAP`] (`load.libsonnet`) walks the value bound to [`EXT_VAR`] and keeps only
//!   the documentation-relevant sub-tree.
//! - [`DOC_UTIL`] (`doc-util/main.libsonnet`) is the helper library documentation authors
//!   import, reachable through any of the [`DOC_UTIL_PATHS`] aliases.

/// Program evaluated by the extraction engine.
pub const BOOTSTRAP: &str = include_str!("bundle/load.libsonnet");

/// Name the bootstrap program is evaluated under, as it shows up in diagnostics.
pub const BOOTSTRAP_NAME: &str = "load.libsonnet";

/// The docsonnet utility library.
pub const DOC_UTIL: &str = include_str!("bundle/doc-util/main.libsonnet");

/// Import paths answered with [`DOC_UTIL`]. Matching is exact: `./doc-util/main.libsonnet`
/// or any other spelling goes to the filesystem.
pub const DOC_UTIL_PATHS: [&str; 2] = [
    "doc-util/main.libsonnet",
    "github.com/jsonnet-libs/docsonnet/doc-util/main.libsonnet",
];

/// External code variable holding the file under inspection. [`BOOTSTRAP`] reads it with
/// `std.extVar`, so renaming it means changing both.
pub const EXT_VAR: &str = "main";

/// Whether `path` is one of the [`DOC_UTIL_PATHS`] aliases.
pub fn is_doc_util_path(path: &str) -> bool {
    DOC_UTIL_PATHS.contains(&path)
}
