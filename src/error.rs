//! Error types for pdf-outline.

use std::io;
use thiserror::Error;

/// Result type alias for pdf-outline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during outline extraction.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading block dumps, options or model artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON in a block dump, options file or model artifact.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A built-in or configured pattern failed to compile.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A text block carries unusable geometry or font data.
    #[error("Invalid text block: {0}")]
    InvalidBlock(String),

    /// A page description is unusable (zero or non-finite size).
    #[error("Invalid page: {0}")]
    InvalidPage(String),

    /// A model artifact exists but could not be loaded.
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// A loaded model could not score the given input.
    #[error("Model inference error: {0}")]
    ModelInference(String),

    /// A detection strategy failed on a document.
    #[error("Strategy {strategy} failed: {message}")]
    Strategy {
        /// Name of the failing strategy
        strategy: &'static str,
        /// Failure description
        message: String,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Error while rendering an outline.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
