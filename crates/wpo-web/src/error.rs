//! Error types for page optimization.

use thiserror::Error;

/// Errors raised while optimizing a page.
///
/// [`PageOptimizer::optimize_page`](crate::PageOptimizer::optimize_page)
/// never surfaces these; it logs them and serves the original markup.
#[derive(Debug, Error)]
pub enum OptimizeError {
    /// Building the merged artifact failed.
    #[error("storage error: {0}")]
    Storage(#[from] wpo_storage::StorageError),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The configured charset is not supported.
    #[error("unsupported charset: {0}")]
    UnsupportedCharset(String),

    /// The page markup could not be scanned.
    #[error("markup error: {0}")]
    Markup(String),
}

/// Result type for page optimization.
pub type Result<T> = std::result::Result<T, OptimizeError>;
