//! Remote book store over HTTP.
//!
//! Talks to the book API:
//!
//! ```text
//! GET    {base}/books        -> [BookSummary]
//! POST   {base}/books        <- Book         (201, 400 bad id/body, 409 exists)
//! GET    {base}/books/{id}   -> Book         (404 missing)
//! PUT    {base}/books/{id}   <- Book         (full replace)
//! DELETE {base}/books/{id}                   (soft delete, 404 missing)
//! ```
//!
//! Error bodies are `{"error": "..."}`. Transport failures map to
//! `StoreError::Network` and 5xx responses to `StoreError::Server`, which are
//! the two kinds the persistence client retries.

use crate::{BookStore, Result, StoreError};
use book_model::{Book, BookId, BookSummary};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// `BookStore` backed by the remote book API
#[derive(Debug, Clone)]
pub struct HttpBookStore {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpBookStore {
    /// Create a store for an API root such as `http://localhost:3000/api`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a store reusing an existing HTTP client
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn books_url(&self) -> String {
        format!("{}/books", self.base_url)
    }

    fn book_url(&self, id: &BookId) -> String {
        format!("{}/books/{}", self.base_url, urlencoding::encode(id.as_str()))
    }

    fn with_body(request: RequestBuilder, book: &Book) -> Result<RequestBuilder> {
        let payload = serde_json::to_string_pretty(book)?;
        Ok(request
            .header("Content-Type", "application/json")
            .body(payload))
    }

    async fn send(&self, request: RequestBuilder, id: &str) -> Result<Response> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let raw = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&raw)
            .map(|body| body.error)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or_default().to_string());
        Err(status_error(status, message, id))
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Map a non-success status to a store error
fn status_error(status: StatusCode, message: String, id: &str) -> StoreError {
    match status {
        StatusCode::NOT_FOUND => StoreError::NotFound(id.to_string()),
        StatusCode::CONFLICT => StoreError::AlreadyExists(id.to_string()),
        s if s.is_server_error() => StoreError::Server {
            status: s.as_u16(),
            message,
        },
        s => StoreError::Rejected {
            status: s.as_u16(),
            message,
        },
    }
}

fn ensure_valid(id: &BookId) -> Result<()> {
    if id.is_valid() {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_string()))
    }
}

impl BookStore for HttpBookStore {
    async fn list_books(&self) -> Result<Vec<BookSummary>> {
        let response = self.send(self.client.get(self.books_url()), "").await?;
        Self::read_json(response).await
    }

    async fn create_book(&self, book: &Book) -> Result<()> {
        ensure_valid(&book.id)?;
        let request = Self::with_body(self.client.post(self.books_url()), book)?;
        self.send(request, book.id.as_str()).await?;
        Ok(())
    }

    async fn fetch_book(&self, id: &BookId) -> Result<Book> {
        ensure_valid(id)?;
        let response = self.send(self.client.get(self.book_url(id)), id.as_str()).await?;
        Self::read_json(response).await
    }

    async fn replace_book(&self, book: &Book) -> Result<()> {
        ensure_valid(&book.id)?;
        let request = Self::with_body(self.client.put(self.book_url(&book.id)), book)?;
        self.send(request, book.id.as_str()).await?;
        Ok(())
    }

    async fn delete_book(&self, id: &BookId) -> Result<()> {
        ensure_valid(id)?;
        self.send(self.client.delete(self.book_url(id)), id.as_str())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let store = HttpBookStore::new("http://localhost:3000/api/");
        assert_eq!(store.base_url(), "http://localhost:3000/api");
        assert_eq!(store.books_url(), "http://localhost:3000/api/books");
        assert_eq!(
            store.book_url(&BookId::parse("song_of_songs").unwrap()),
            "http://localhost:3000/api/books/song_of_songs"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "Not found".into(), "ruth"),
            StoreError::NotFound(ref id) if id == "ruth"
        ));
        assert!(matches!(
            status_error(StatusCode::CONFLICT, "Book already exists".into(), "ruth"),
            StoreError::AlreadyExists(_)
        ));
        let unavailable = status_error(StatusCode::SERVICE_UNAVAILABLE, "down".into(), "");
        assert!(unavailable.is_transient());
        let rejected = status_error(StatusCode::BAD_REQUEST, "Invalid JSON body".into(), "");
        assert!(matches!(rejected, StoreError::Rejected { status: 400, .. }));
        assert!(!rejected.is_transient());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let store = HttpBookStore::new("http://127.0.0.1:9/api")
            .with_timeout(Duration::from_millis(500));
        let err = store.list_books().await.unwrap_err();
        assert!(matches!(err, StoreError::Network(_)));
    }
}
