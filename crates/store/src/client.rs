//! Persistence client with bounded retry
//!
//! Every call the editor makes to the book store goes through
//! `PersistenceClient`, which retries transient failures (network errors and
//! 5xx responses) with exponential backoff. Any other outcome is returned on
//! the first attempt. The client adds no idempotency of its own: it relies on
//! the store treating a whole-book replace as last-write-wins.

use crate::{BookStore, Result};
use book_model::{Book, BookId, BookSummary};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles after each further failure
    pub initial_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Set the number of attempts
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the initial backoff
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff_ms = backoff.as_millis() as u64;
        self
    }

    /// Delay to wait after failed attempt `attempt` (0-based)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.initial_backoff_ms.saturating_mul(factor))
    }

    /// Run `call` until it succeeds, fails permanently, or attempts run out.
    ///
    /// The error of the last attempt is returned when every attempt failed.
    /// No delay follows the final attempt.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt + 1 < max_attempts => {
                    let delay = self.backoff_for(attempt);
                    tracing::warn!(
                        operation,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Transient store failure, retrying: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Retrying front for a `BookStore`
pub struct PersistenceClient<S> {
    store: Arc<S>,
    policy: RetryPolicy,
}

impl<S> Clone for PersistenceClient<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy.clone(),
        }
    }
}

impl<S: BookStore> PersistenceClient<S> {
    /// Create a client with the default retry policy
    pub fn new(store: Arc<S>) -> Self {
        Self::with_policy(store, RetryPolicy::default())
    }

    /// Create a client with a custom retry policy
    pub fn with_policy(store: Arc<S>, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The retry policy
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn list_books(&self) -> Result<Vec<BookSummary>> {
        self.policy
            .run("list_books", move || self.store.list_books())
            .await
    }

    pub async fn create_book(&self, book: &Book) -> Result<()> {
        self.policy
            .run("create_book", move || self.store.create_book(book))
            .await
    }

    pub async fn fetch_book(&self, id: &BookId) -> Result<Book> {
        self.policy
            .run("fetch_book", move || self.store.fetch_book(id))
            .await
    }

    pub async fn replace_book(&self, book: &Book) -> Result<()> {
        self.policy
            .run("replace_book", move || self.store.replace_book(book))
            .await
    }

    pub async fn delete_book(&self, id: &BookId) -> Result<()> {
        self.policy
            .run("delete_book", move || self.store.delete_book(id))
            .await
    }
}
