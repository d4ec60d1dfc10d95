//! Shared fixtures for store tests

use crate::{BookStore, MemoryBookStore, Result, StoreError};
use book_model::{Book, BookId, BookName, BookSummary};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn sample_book() -> Book {
    Book::new_empty(BookId::parse("genesis").unwrap(), BookName::uniform("Genesis"))
}

pub fn unavailable() -> StoreError {
    StoreError::Server {
        status: 503,
        message: "Service Unavailable".into(),
    }
}

/// Store that fails with queued errors before delegating to memory
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryBookStore,
    failures: Mutex<VecDeque<StoreError>>,
    calls: AtomicUsize,
}

impl FlakyStore {
    pub fn failing_with(errors: impl IntoIterator<Item = StoreError>) -> Self {
        Self {
            failures: Mutex::new(errors.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn push_failure(&self, error: StoreError) {
        self.failures.lock().unwrap().push_back(error);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn stored(&self, id: &BookId) -> Option<Book> {
        self.inner.get(id)
    }

    fn next_failure(&self) -> Option<StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.failures.lock().unwrap().pop_front()
    }
}

impl BookStore for FlakyStore {
    async fn list_books(&self) -> Result<Vec<BookSummary>> {
        match self.next_failure() {
            Some(e) => Err(e),
            None => self.inner.list_books().await,
        }
    }

    async fn create_book(&self, book: &Book) -> Result<()> {
        match self.next_failure() {
            Some(e) => Err(e),
            None => self.inner.create_book(book).await,
        }
    }

    async fn fetch_book(&self, id: &BookId) -> Result<Book> {
        match self.next_failure() {
            Some(e) => Err(e),
            None => self.inner.fetch_book(id).await,
        }
    }

    async fn replace_book(&self, book: &Book) -> Result<()> {
        match self.next_failure() {
            Some(e) => Err(e),
            None => self.inner.replace_book(book).await,
        }
    }

    async fn delete_book(&self, id: &BookId) -> Result<()> {
        match self.next_failure() {
            Some(e) => Err(e),
            None => self.inner.delete_book(id).await,
        }
    }
}
