use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AidataError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Config error in {path}: {message}")]
    ConfigError { path: PathBuf, message: String },
    #[error("{0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Usage error: {0}")]
    UsageError(String),
    #[error("Operation cancelled by user.")]
    Cancelled,
}

impl AidataError {
    /// I/O failure annotated with the file it happened on.
    pub fn io_at(path: &std::path::Path, err: io::Error) -> Self {
        AidataError::IoError(io::Error::new(
            err.kind(),
            format!("{}: {}", path.display(), err),
        ))
    }
}
