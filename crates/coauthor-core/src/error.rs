//! Error types for patch construction and application.

use crate::patch::Operation;
use thiserror::Error;

/// Errors raised while building or applying a patch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("Invalid range [{start}, {end}) for content of length {length}")]
    InvalidRange {
        start: usize,
        end: usize,
        length: usize,
    },

    #[error("Inverted range: start {start} is past end {end}")]
    InvertedRange { start: usize, end: usize },

    #[error("Content inconsistent with {operation} operation: {reason}")]
    InconsistentContent {
        operation: Operation,
        reason: String,
    },

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Unknown author: {0}")]
    UnknownAuthor(String),
}

impl PatchError {
    /// Whether this error describes a bad `[start, end)` range.
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            PatchError::InvalidRange { .. } | PatchError::InvertedRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PatchError>;
