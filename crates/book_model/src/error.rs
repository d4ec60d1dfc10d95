//! Error types for book model operations

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookModelError {
    #[error("Invalid book id: {0:?} (expected lowercase letters, digits, '-' or '_')")]
    InvalidBookId(String),
}

pub type Result<T> = std::result::Result<T, BookModelError>;
