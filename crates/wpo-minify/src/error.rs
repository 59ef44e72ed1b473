//! Minification error types.

use thiserror::Error;

/// Errors that can occur while minifying a resource.
#[derive(Debug, Error)]
pub enum MinifyError {
    /// Reading the source or writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The style sheet could not be parsed.
    #[error("style sheet parse error: {0}")]
    StyleParse(String),

    /// The style sheet could not be minified.
    #[error("style sheet minify error: {0}")]
    StyleMinify(String),

    /// The minified style sheet could not be printed.
    #[error("style sheet print error: {0}")]
    StylePrint(String),
}
