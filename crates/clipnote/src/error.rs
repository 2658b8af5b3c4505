//! Error types for ClipNote

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while turning clipboard content into a note
#[derive(Debug, Error)]
pub enum NoteError {
    /// Input does not match the parser's pattern
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Remote data could not be obtained
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Remote data lacks the required structure
    #[error("Parse failed: {0}")]
    Parse(String),

    /// No registered parser accepted the input
    #[error("No parser matched the input")]
    NoParserMatched,

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Target note already exists in the vault
    #[error("Note already exists: {}", .0.display())]
    NoteExists(PathBuf),

    /// Vault file system error
    #[error("Vault I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings could not be loaded
    #[error("Invalid settings: {0}")]
    Settings(String),
}

impl NoteError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NoteError::Timeout
        } else if err.is_connect() {
            NoteError::Fetch(format!("failed to connect: {}", err))
        } else {
            NoteError::Fetch(err.to_string())
        }
    }
}
