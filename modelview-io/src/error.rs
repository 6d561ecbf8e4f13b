//! Error types for scene import

use thiserror::Error;

/// Errors raised while locating or parsing a scene file
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Unsupported scene format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Failed to parse {format} file {path}: {message}")]
    Parse {
        format: &'static str,
        path: String,
        message: String,
    },
}

impl From<ImportError> for modelview_core::Error {
    fn from(err: ImportError) -> Self {
        let message = err.to_string();
        match err {
            ImportError::FileNotFound { path } => modelview_core::Error::Io(
                std::io::Error::new(std::io::ErrorKind::NotFound, path),
            ),
            ImportError::UnsupportedFormat { .. } => modelview_core::Error::UnsupportedFormat(message),
            ImportError::Parse { .. } => modelview_core::Error::Import(message),
        }
    }
}
