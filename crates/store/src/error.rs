//! Error types for storage operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid book id: {0}")]
    InvalidId(String),

    #[error("Book already exists: {0}")]
    AlreadyExists(String),

    #[error("Book not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether retrying the same request may succeed.
    ///
    /// Only network failures and 5xx responses qualify; validation, conflict
    /// and not-found failures are final.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Network(_) | StoreError::Server { .. })
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
