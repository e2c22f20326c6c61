//! Import resolution
//!
//! Every `import`, `importstr` and `importbin` the interpreter meets goes through an
//! [`Importer`]. [`BundledImporter`] answers the [`DOC_UTIL_PATHS`] aliases from memory and
//! hands everything else to an inner importer, normally a [`FileImporter`] configured
//! with the caller's search paths.
//!
//! # Resolution order
//!
//! [`FileImporter`] looks in the directory of the importing file first, then walks the
//! search paths from the last one to the first. A missing candidate moves on to the
//! next one; any other I/O failure stops the search and is reported as is.
//!
//! [`DOC_UTIL_PATHS`]: crate::bundle::DOC_UTIL_PATHS

use crate::bundle::{is_doc_util_path, DOC_UTIL};
use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Location tag of content served from memory.
pub const INTERNAL_LOCATION: &str = "<internal>";

/// Raw bytes of an imported file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contents(Cow<'static, [u8]>);

impl Contents {
    pub fn from_static(text: &'static str) -> Self {
        Self(Cow::Borrowed(text.as_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The contents as text, if they are valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0.into_owned()
    }
}

impl From<Vec<u8>> for Contents {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Cow::Owned(bytes))
    }
}

impl From<String> for Contents {
    fn from(text: String) -> Self {
        Self(Cow::Owned(text.into_bytes()))
    }
}

/// Where resolved contents came from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FoundAt {
    /// Served from memory; there is nothing on disk to resolve further imports against.
    Internal,
    File(PathBuf),
}

impl FoundAt {
    pub fn is_internal(&self) -> bool {
        matches!(self, FoundAt::Internal)
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            FoundAt::Internal => None,
            FoundAt::File(path) => Some(path),
        }
    }
}

impl fmt::Display for FoundAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoundAt::Internal => f.write_str(INTERNAL_LOCATION),
            FoundAt::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A successful import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub contents: Contents,
    pub found_at: FoundAt,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("couldn't open import {path:?}: no match locally or in the Jsonnet library paths")]
    NotFound { path: String },

    #[error("couldn't read {}: {source}", .location.display())]
    Io {
        location: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid search path {path:?}: {reason}")]
    InvalidSearchPath { path: PathBuf, reason: &'static str },

    /// Jsonnet import paths are strings; this one can't be spelled as one.
    #[error("can't import {path:?}: path is not valid UTF-8")]
    NonUtf8Path { path: PathBuf },
}

/// Resolves `(imported_from, imported_path)` pairs to file contents.
///
/// `imported_from` is the directory of the importing file. It is empty for snippets and
/// external code, so relative paths resolve against the working directory.
pub trait Importer {
    fn import(&self, imported_from: &Path, imported_path: &str) -> Result<Resolved, ImportError>;
}

/// Search-path based importer over the real filesystem
#[derive(Debug, Clone, Default)]
pub struct FileImporter {
    search_paths: Vec<PathBuf>,
}

impl FileImporter {
    /// Build an importer over `search_paths`.
    ///
    /// Directories that don't exist are accepted and simply never match. Empty entries and
    /// entries naming something other than a directory are rejected.
    pub fn new<I, P>(search_paths: I) -> Result<Self, ImportError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let search_paths: Vec<PathBuf> = search_paths.into_iter().map(Into::into).collect();
        for path in &search_paths {
            if path.as_os_str().is_empty() {
                return Err(ImportError::InvalidSearchPath {
                    path: path.clone(),
                    reason: "empty path",
                });
            }
            if path.exists() && !path.is_dir() {
                return Err(ImportError::InvalidSearchPath {
                    path: path.clone(),
                    reason: "not a directory",
                });
            }
        }
        Ok(Self { search_paths })
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    fn try_path(dir: &Path, imported_path: &str) -> Result<Option<Resolved>, ImportError> {
        // an absolute imported_path replaces dir entirely
        let candidate = dir.join(imported_path);
        match fs::read(&candidate) {
            Ok(bytes) => Ok(Some(Resolved {
                contents: Contents::from(bytes),
                found_at: FoundAt::File(candidate),
            })),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ImportError::Io {
                location: candidate,
                source,
            }),
        }
    }
}

impl Importer for FileImporter {
    fn import(&self, imported_from: &Path, imported_path: &str) -> Result<Resolved, ImportError> {
        if let Some(found) = Self::try_path(imported_from, imported_path)? {
            return Ok(found);
        }
        for dir in self.search_paths.iter().rev() {
            if let Some(found) = Self::try_path(dir, imported_path)? {
                return Ok(found);
            }
        }
        Err(ImportError::NotFound {
            path: imported_path.to_string(),
        })
    }
}

/// Serves the bundled doc-util library under its aliases and delegates the rest
#[derive(Debug, Clone)]
pub struct BundledImporter<I = FileImporter> {
    inner: I,
}

impl<I: Importer> BundledImporter<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }
}

impl<I: Importer> Importer for BundledImporter<I> {
    fn import(&self, imported_from: &Path, imported_path: &str) -> Result<Resolved, ImportError> {
        if is_doc_util_path(imported_path) {
            tracing::trace!(path = imported_path, "serving bundled doc-util");
            return Ok(Resolved {
                contents: Contents::from_static(DOC_UTIL),
                found_at: FoundAt::Internal,
            });
        }
        self.inner.import(imported_from, imported_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::DOC_UTIL_PATHS;
    use rstest::rstest;
    use tempfile::TempDir;

    /// Lays out:
    ///
    /// ```text
    /// pkg/main.jsonnet
    /// pkg/local.libsonnet           "local"
    /// lib-a/shared.libsonnet        "lib-a"
    /// lib-a/only-a.libsonnet        "only-a"
    /// lib-b/shared.libsonnet        "lib-b"
    /// lib-b/local.libsonnet         "lib-b-local"
    /// ```
    fn workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        let files = [
            ("pkg/main.jsonnet", "{}"),
            ("pkg/local.libsonnet", "local"),
            ("lib-a/shared.libsonnet", "lib-a"),
            ("lib-a/only-a.libsonnet", "only-a"),
            ("lib-b/shared.libsonnet", "lib-b"),
            ("lib-b/local.libsonnet", "lib-b-local"),
        ];
        for (name, text) in files {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, text).unwrap();
        }
        dir
    }

    fn file_importer(dir: &TempDir) -> FileImporter {
        FileImporter::new([dir.path().join("lib-a"), dir.path().join("lib-b")]).unwrap()
    }

    fn text(resolved: &Resolved) -> &str {
        resolved.contents.as_str().unwrap()
    }

    #[rstest(from, case(""), case("."), case("/nonexistent/dir"), case("pkg"))]
    fn test_aliases_are_served_from_memory(from: &str) {
        let importer = BundledImporter::new(FileImporter::default());
        for alias in DOC_UTIL_PATHS {
            let resolved = importer.import(Path::new(from), alias).unwrap();
            assert_eq!(resolved.found_at, FoundAt::Internal);
            assert_eq!(resolved.found_at.to_string(), "<internal>");
            assert_eq!(text(&resolved), DOC_UTIL);
        }
    }

    #[test]
    fn test_alias_wins_over_a_file_on_disk() {
        let dir = workspace();
        let shadow = dir.path().join("pkg/doc-util/main.libsonnet");
        fs::create_dir_all(shadow.parent().unwrap()).unwrap();
        fs::write(&shadow, "{ shadowed: true }").unwrap();

        let importer = BundledImporter::new(file_importer(&dir));
        let resolved = importer
            .import(&dir.path().join("pkg"), "doc-util/main.libsonnet")
            .unwrap();
        assert!(resolved.found_at.is_internal());
        assert_eq!(text(&resolved), DOC_UTIL);
    }

    #[rstest(
        imported_path,
        case("local.libsonnet"),
        case("shared.libsonnet"),
        case("only-a.libsonnet"),
        case("missing.libsonnet"),
        case("./doc-util/main.libsonnet"),
        case("main.jsonnet")
    )]
    fn test_other_paths_are_delegated(imported_path: &str) {
        let dir = workspace();
        let from = dir.path().join("pkg");
        let plain = file_importer(&dir);
        let bundled = BundledImporter::new(file_importer(&dir));

        match (
            plain.import(&from, imported_path),
            bundled.import(&from, imported_path),
        ) {
            (Ok(expected), Ok(actual)) => assert_eq!(expected, actual),
            (Err(expected), Err(actual)) => assert_eq!(expected.to_string(), actual.to_string()),
            (expected, actual) => panic!("expected {:?}, got {:?}", expected, actual),
        }
    }

    #[test]
    fn test_importing_directory_comes_first() {
        let dir = workspace();
        let resolved = file_importer(&dir)
            .import(&dir.path().join("pkg"), "local.libsonnet")
            .unwrap();
        assert_eq!(text(&resolved), "local");
        assert_eq!(
            resolved.found_at,
            FoundAt::File(dir.path().join("pkg").join("local.libsonnet"))
        );
    }

    #[test]
    fn test_later_search_paths_take_precedence() {
        let dir = workspace();
        let importer = file_importer(&dir);
        let from = dir.path().join("pkg");

        assert_eq!(text(&importer.import(&from, "shared.libsonnet").unwrap()), "lib-b");
        assert_eq!(text(&importer.import(&from, "only-a.libsonnet").unwrap()), "only-a");
    }

    #[test]
    fn test_absolute_paths_ignore_search_paths() {
        let dir = workspace();
        let target = dir.path().join("lib-a/shared.libsonnet");
        let resolved = file_importer(&dir)
            .import(Path::new(""), target.to_str().unwrap())
            .unwrap();
        assert_eq!(text(&resolved), "lib-a");
    }

    #[test]
    fn test_missing_import_names_the_path() {
        let dir = workspace();
        let err = file_importer(&dir)
            .import(&dir.path().join("pkg"), "missing.libsonnet")
            .unwrap_err();
        assert!(matches!(err, ImportError::NotFound { .. }));
        insta::assert_snapshot!(
            err.to_string(),
            @r#"couldn't open import "missing.libsonnet": no match locally or in the Jsonnet library paths"#
        );
    }

    #[test]
    fn test_read_failures_stop_the_search() {
        let dir = workspace();
        // a directory where the importing file's sibling would be
        fs::create_dir_all(dir.path().join("pkg/shared.libsonnet")).unwrap();

        let err = file_importer(&dir)
            .import(&dir.path().join("pkg"), "shared.libsonnet")
            .unwrap_err();
        assert!(matches!(err, ImportError::Io { .. }), "got {:?}", err);
    }

    #[test]
    fn test_search_path_validation() {
        let dir = workspace();

        let err = FileImporter::new([""]).unwrap_err();
        assert!(matches!(err, ImportError::InvalidSearchPath { reason: "empty path", .. }));

        let err = FileImporter::new([dir.path().join("pkg/main.jsonnet")]).unwrap_err();
        assert!(matches!(
            err,
            ImportError::InvalidSearchPath { reason: "not a directory", .. }
        ));

        let importer = FileImporter::new([dir.path().join("does-not-exist")]).unwrap();
        assert_eq!(importer.search_paths().len(), 1);
    }
}
