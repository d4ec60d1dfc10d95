//! Error types for editing operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("No book is open")]
    NoOpenBook,
}

pub type Result<T> = std::result::Result<T, EditError>;
