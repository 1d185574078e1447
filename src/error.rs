//! Error types shared by every module of the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The model was asked to run before any parameters were set or loaded.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A resume was requested but the store holds no checkpoint.
    #[error("no checkpoint found in {0}")]
    MissingCheckpoint(PathBuf),

    /// A file that must exist could not be read or written.
    #[error("cannot access {path}: {source}")]
    DataAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A named resource (checkpoint, labelled sample) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller-supplied input was rejected.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Matrix dimensions do not agree.
    #[error("shape mismatch: {0}")]
    Shape(String),

    /// Bytes on disk do not follow the expected layout.
    #[error("malformed data: {0}")]
    Format(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn data_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::DataAccess { path: path.into(), source }
    }

    /// Whether the error came from the caller's input rather than from the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_) | Error::Shape(_) | Error::NotFound(_) | Error::Json(_)
        )
    }
}
