use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read document {path}: {reason}")]
    DocumentUnreadable { path: PathBuf, reason: String },

    #[error("No syllabus structure found: {0}")]
    NoStructuredContent(String),

    #[error("Database error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Completion must be between 0 and 100, got {0}")]
    InvalidCompletion(i32),

    #[error("Importance must be between 0 and 5, got {0}")]
    InvalidImportance(i32),

    #[error("Invalid configuration in {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the failure came from the document rather than the store.
    pub fn is_extraction_failure(&self) -> bool {
        matches!(
            self,
            Error::DocumentUnreadable { .. } | Error::NoStructuredContent(_)
        )
    }
}
