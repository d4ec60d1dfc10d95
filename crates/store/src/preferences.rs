//! Local UI preferences
//!
//! The only persisted preference is the user's book display order: an ordered
//! list of book ids kept in the app data directory under a constant key.
//! Unreadable or malformed state means "no preference" and is never an error.

use crate::Result;
use book_model::BookId;
use std::path::{Path, PathBuf};

/// Storage key of the book order preference
pub const BOOK_ORDER_STORAGE_KEY: &str = "armenian-bible-book-order";

/// Persisted book display order
#[derive(Debug, Clone)]
pub struct BookOrderPreference {
    path: PathBuf,
}

impl BookOrderPreference {
    /// Create a preference stored in the given app data directory
    pub fn new(app_data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: app_data_dir
                .as_ref()
                .join(format!("{}.json", BOOK_ORDER_STORAGE_KEY)),
        }
    }

    /// Get the path to the preference file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved order, or an empty list when there is none
    pub async fn load(&self) -> Vec<String> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read book order, ignoring it: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(serde_json::Value::Array(entries)) => entries
                .into_iter()
                .filter_map(|entry| match entry {
                    serde_json::Value::String(id) => Some(id),
                    _ => None,
                })
                .collect(),
            Ok(_) => {
                tracing::warn!("Book order is not a list, ignoring it");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Failed to parse book order, ignoring it: {}", e);
                Vec::new()
            }
        }
    }

    /// Save the display order
    pub async fn save(&self, ids: &[BookId]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string(ids)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}
