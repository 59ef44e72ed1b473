//! Storage error types.

use thiserror::Error;

/// Errors that can occur while reading sources or building artifacts.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A member resource could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// The resource that failed.
        path: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An artifact could not be written.
    #[error("cannot write {path}: {source}")]
    Write {
        /// The artifact that failed.
        path: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The identifier cannot be mapped into the deployment root.
    #[error("invalid resource path: {0}")]
    InvalidPath(String),

    /// The resource is not valid text in the configured charset.
    #[error("{path} is not representable as {charset}")]
    Encoding {
        /// The offending resource.
        path: String,
        /// Name of the charset in use.
        charset: &'static str,
    },

    /// Compressing an artifact failed.
    #[error("compression error: {0}")]
    Compression(String),

    /// Minifying an artifact failed.
    #[error("minify error: {0}")]
    Minify(#[from] wpo_minify::MinifyError),

    /// An artifact was requested for a set with no members.
    #[error("cannot build an artifact from an empty reference set")]
    EmptyReferenceSet,
}

/// A specialized Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
