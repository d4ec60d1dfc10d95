//! In-memory book store implementation.
//!
//! `MemoryBookStore` keeps books in a map guarded by an `RwLock`. It is used
//! for tests and offline sessions where nothing needs to survive a restart.
//! Soft-deleted books move to a separate trash map.

use crate::{BookStore, Result, StoreError};
use book_model::{Book, BookId, BookSummary};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

/// In-memory implementation of `BookStore`
#[derive(Debug, Default)]
pub struct MemoryBookStore {
    books: RwLock<BTreeMap<BookId, Book>>,
    trash: RwLock<BTreeMap<BookId, Book>>,
    /// Number of successful create/replace calls
    writes: AtomicUsize,
}

impl MemoryBookStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with books
    pub fn with_books(books: impl IntoIterator<Item = Book>) -> Self {
        let store = Self::new();
        {
            let mut map = store.books.write().unwrap_or_else(PoisonError::into_inner);
            for book in books {
                map.insert(book.id.clone(), book);
            }
        }
        store
    }

    /// Number of active books
    pub fn book_count(&self) -> usize {
        self.books.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Get a soft-deleted book
    pub fn trashed(&self, id: &BookId) -> Option<Book> {
        self.trash
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Synchronous lookup of the stored copy
    pub fn get(&self, id: &BookId) -> Option<Book> {
        self.books
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }
}

impl BookStore for MemoryBookStore {
    async fn list_books(&self) -> Result<Vec<BookSummary>> {
        let books = self.books.read().unwrap_or_else(PoisonError::into_inner);
        Ok(books.values().map(Book::summary).collect())
    }

    async fn create_book(&self, book: &Book) -> Result<()> {
        if !book.id.is_valid() {
            return Err(StoreError::InvalidId(book.id.to_string()));
        }
        let mut books = self.books.write().unwrap_or_else(PoisonError::into_inner);
        if books.contains_key(&book.id) {
            return Err(StoreError::AlreadyExists(book.id.to_string()));
        }
        books.insert(book.id.clone(), book.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn fetch_book(&self, id: &BookId) -> Result<Book> {
        self.get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn replace_book(&self, book: &Book) -> Result<()> {
        if !book.id.is_valid() {
            return Err(StoreError::InvalidId(book.id.to_string()));
        }
        self.books
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(book.id.clone(), book.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_book(&self, id: &BookId) -> Result<()> {
        let removed = self
            .books
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.trash
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), removed);
        Ok(())
    }
}
