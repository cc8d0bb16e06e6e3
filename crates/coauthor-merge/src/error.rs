//! Error types for the merge layer.

use thiserror::Error;

/// Errors raised while configuring a merge.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("Unknown merge strategy: {0}")]
    UnknownMergeStrategy(String),
}

pub type Result<T> = std::result::Result<T, MergeError>;
