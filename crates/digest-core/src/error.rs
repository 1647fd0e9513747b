use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigestError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No PDF files found in '{}'", .0.display())]
    NoPdfFiles(PathBuf),

    #[error("No sections extracted from any document")]
    NoSections,

    #[error("Failed to read PDF '{}': {message}", .path.display())]
    Pdf { path: PathBuf, message: String },

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DigestError>;
