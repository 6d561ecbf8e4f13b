//! Error types for modelview

use thiserror::Error;

/// Main error type for modelview operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Incomplete scene: {0}")]
    IncompleteScene(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Texture error: {0}")]
    Texture(String),

    #[error("Shader error: {0}")]
    Shader(String),

    #[error("GPU error: {0}")]
    Gpu(String),
}

/// Result type alias for modelview operations
pub type Result<T> = std::result::Result<T, Error>;
