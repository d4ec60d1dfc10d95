//! File-based book store implementation.
//!
//! `FileBookStore` keeps one pretty-printed JSON file per book in a data
//! directory. Soft-deleted books are moved into a `.trash` subdirectory.
//!
//! # Directory Structure
//!
//! ```text
//! data/
//! ├── genesis.json
//! ├── exodus.json
//! └── .trash/
//!     └── leviticus.json
//! ```

use crate::{BookStore, Result, StoreError};
use book_model::{is_valid_book_id, Book, BookId, BookSummary};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Name of the recovery directory inside the data directory
pub const TRASH_DIR: &str = ".trash";

/// Extension of persisted book files
pub const BOOK_FILE_EXTENSION: &str = "json";

/// Directory-backed implementation of `BookStore`
#[derive(Debug, Clone)]
pub struct FileBookStore {
    data_dir: PathBuf,
}

impl FileBookStore {
    /// Create a store rooted at `data_dir`. The directory is created on first write.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Root data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Recovery directory for soft-deleted books
    pub fn trash_dir(&self) -> PathBuf {
        self.data_dir.join(TRASH_DIR)
    }

    /// Path of the file holding a book
    pub fn book_path(&self, id: &BookId) -> PathBuf {
        self.data_dir.join(format!("{}.{}", id, BOOK_FILE_EXTENSION))
    }

    fn checked_path(&self, id: &BookId) -> Result<PathBuf> {
        // Ids become file names; anything outside the pattern could escape the directory.
        if !is_valid_book_id(id.as_str()) {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.book_path(id))
    }

    async fn read_book(path: &Path) -> Result<Book> {
        let json = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl BookStore for FileBookStore {
    async fn list_books(&self) -> Result<Vec<BookSummary>> {
        let mut entries = match tokio::fs::read_dir(&self.data_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut summaries = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_book_file = path.extension().is_some_and(|ext| ext == BOOK_FILE_EXTENSION)
                && entry.file_type().await?.is_file();
            if !is_book_file {
                continue;
            }
            match Self::read_book(&path).await {
                Ok(book) => summaries.push(book.summary()),
                Err(e) => {
                    tracing::warn!("Skipping unreadable book file {}: {}", path.display(), e);
                }
            }
        }

        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }

    async fn create_book(&self, book: &Book) -> Result<()> {
        let path = self.checked_path(&book.id)?;
        tokio::fs::create_dir_all(&self.data_dir).await?;

        let json = serde_json::to_string_pretty(book)?;
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists(book.id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(json.as_bytes()).await?;
        file.flush().await?;

        tracing::info!("Created book {}", book.id);
        Ok(())
    }

    async fn fetch_book(&self, id: &BookId) -> Result<Book> {
        let path = self.checked_path(id)?;
        match Self::read_book(&path).await {
            Err(StoreError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(id.to_string()))
            }
            other => other,
        }
    }

    async fn replace_book(&self, book: &Book) -> Result<()> {
        let path = self.checked_path(&book.id)?;
        tokio::fs::create_dir_all(&self.data_dir).await?;

        // Write beside the target and rename so readers never see a torn file.
        let json = serde_json::to_string_pretty(book)?;
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, json).await?;
        tokio::fs::rename(&staging, &path).await?;
        Ok(())
    }

    async fn delete_book(&self, id: &BookId) -> Result<()> {
        let path = self.checked_path(id)?;
        if !tokio::fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let trash = self.trash_dir();
        tokio::fs::create_dir_all(&trash).await?;
        tokio::fs::rename(&path, trash.join(format!("{}.{}", id, BOOK_FILE_EXTENSION))).await?;

        tracing::info!("Moved book {} to {}", id, trash.display());
        Ok(())
    }
}
