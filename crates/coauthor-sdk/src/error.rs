//! Error types for the SDK.

use coauthor_db::DbError;
use thiserror::Error;

/// Error type for SDK operations.
#[derive(Error, Debug, Clone)]
pub enum SdkError {
    /// The store rejected an operation.
    #[error("Store error: {0}")]
    Db(#[from] DbError),

    /// A stream is already being driven.
    #[error("Patch stream already running")]
    StreamAlreadyRunning,

    /// The stream driver was stopped and must be reset first.
    #[error("Patch stream stopped")]
    StreamStopped,

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        SdkError::SerializationError(err.to_string())
    }
}

/// Result type for SDK operations.
pub type Result<T> = std::result::Result<T, SdkError>;
