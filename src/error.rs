//! Error types for modhost.

use thiserror::Error;

/// Common error type for modhost.
#[derive(Error, Debug)]
pub enum ModhostError {
    /// A modpack with the same id already has a directory.
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// The supplied token does not own the modpack.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A client-supplied id or relative path would leave the modpack root.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A required part of the request is missing or malformed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive could not be read or contains an unsafe entry.
    #[error("archive error: {0}")]
    Archive(String),

    /// Metadata or hash manifest on disk is not valid JSON of the expected shape.
    #[error("metadata error: {0}")]
    Metadata(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<zip::result::ZipError> for ModhostError {
    fn from(e: zip::result::ZipError) -> Self {
        match e {
            zip::result::ZipError::Io(io) => ModhostError::Io(io),
            other => ModhostError::Archive(other.to_string()),
        }
    }
}

/// Result type alias for modhost operations.
pub type Result<T> = std::result::Result<T, ModhostError>;
