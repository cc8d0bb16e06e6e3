//! Error types for the store layer.

use coauthor_core::PatchError;
use thiserror::Error;

/// Errors that can occur in store operations.
#[derive(Error, Debug, Clone)]
pub enum DbError {
    #[error("Section not found: {0}")]
    MissingSection(String),

    #[error("Section already exists: {0}")]
    DuplicateSection(String),

    #[error("Patch already applied: {0}")]
    DuplicatePatch(String),

    #[error("Patch {patch} targets section {target}, not {section}")]
    SectionMismatch {
        patch: String,
        target: String,
        section: String,
    },

    #[error("Patch rejected: {0}")]
    Patch(#[from] PatchError),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
