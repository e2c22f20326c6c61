//! Error types for the extraction pipeline
//!
//! The three top-level variants of [`Error`] answer different questions: the search paths or
//! target path can't be used ([`Error::Resolver`]), the Jsonnet itself is broken
//! ([`Error::Evaluation`], carrying the interpreter's trace with source positions), or the
//! extracted data doesn't have the docsonnet shape ([`Error::Structure`]).

use crate::import::ImportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid import configuration: {0}")]
    Resolver(#[source] ImportError),

    /// The interpreter's diagnostic, including its stack trace
    #[error("{0}")]
    Evaluation(String),

    #[error("unexpected docsonnet data: {0}")]
    Structure(#[from] StructureError),
}

impl Error {
    pub fn is_resolver(&self) -> bool {
        matches!(self, Error::Resolver(_))
    }

    pub fn is_evaluation(&self) -> bool {
        matches!(self, Error::Evaluation(_))
    }

    pub fn is_structure(&self) -> bool {
        matches!(self, Error::Structure(_))
    }
}

/// Extracted JSON that can't be turned into a [`Package`](crate::model::Package)
///
/// Locations are JSON Pointers into the extracted document.
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("malformed JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("{location}: missing required field `{field}`")]
    Missing {
        location: String,
        field: &'static str,
    },

    #[error("{location}: expected {expected}, found {found}")]
    WrongType {
        location: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{location}: field lacks one of `function`, `object` or `value`")]
    MissingKind { location: String },

    #[error("{location}: another subpackage is already named {name:?}")]
    DuplicatePackage { location: String, name: String },
}

impl StructureError {
    /// Where in the extracted document the problem is, if it has a location
    pub fn location(&self) -> Option<&str> {
        match self {
            StructureError::Syntax(_) => None,
            StructureError::Missing { location, .. }
            | StructureError::WrongType { location, .. }
            | StructureError::MissingKind { location }
            | StructureError::DuplicatePackage { location, .. } => Some(location),
        }
    }
}
