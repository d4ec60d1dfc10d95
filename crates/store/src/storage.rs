//! Book store abstraction.
//!
//! This module defines the `BookStore` trait: the whole contract the editor
//! relies on when talking to wherever books are kept. Implementations can use
//! memory, a data directory, or a remote HTTP API.
//!
//! # Semantics
//!
//! - Bodies are whole books, serialized verbatim with no envelope.
//! - `replace_book` is a full replace with upsert semantics. Concurrent writes
//!   are last-write-wins; no version token is checked.
//! - `delete_book` is a soft delete: the book leaves the active set but is kept
//!   in a recovery area that only an operator can restore from.

use crate::Result;
use book_model::{Book, BookId, BookSummary};

/// Trait for book storage backends
#[trait_variant::make(Send)]
pub trait BookStore: Send + Sync {
    /// List summaries of all active books
    async fn list_books(&self) -> Result<Vec<BookSummary>>;

    /// Create a new book.
    ///
    /// Fails with `InvalidId` when the id does not match `[a-z0-9_-]+` and
    /// with `AlreadyExists` when a book with that id is already stored; the
    /// stored copy is left unchanged in that case.
    async fn create_book(&self, book: &Book) -> Result<()>;

    /// Fetch one book, failing with `NotFound` when it is absent
    async fn fetch_book(&self, id: &BookId) -> Result<Book>;

    /// Replace the full body of a book, creating it if needed
    async fn replace_book(&self, book: &Book) -> Result<()>;

    /// Move a book out of the active set
    async fn delete_book(&self, id: &BookId) -> Result<()>;
}
