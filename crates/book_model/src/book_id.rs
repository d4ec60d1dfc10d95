//! Book identifiers

use crate::{BookModelError, Result};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn book_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9_-]+$").expect("book id pattern is valid"))
}

/// Check whether a string is an acceptable book id.
pub fn is_valid_book_id(id: &str) -> bool {
    book_id_pattern().is_match(id)
}

/// Immutable identifier of a book.
///
/// Ids are lowercase ASCII letters, digits, hyphens and underscores. They name
/// the persisted file and appear in API paths, so they never change after the
/// book is created. Deserialization does not re-validate: ids read back from
/// the store were validated when the book was created.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    /// Parse and validate a book id
    pub fn parse(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if is_valid_book_id(&id) {
            Ok(Self(id))
        } else {
            Err(BookModelError::InvalidBookId(id))
        }
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id satisfies the id pattern
    pub fn is_valid(&self) -> bool {
        is_valid_book_id(&self.0)
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BookId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for BookId {
    type Error = BookModelError;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ids() {
        for id in ["genesis", "book-1", "1_kings", "a"] {
            assert!(BookId::parse(id).is_ok(), "{id} should be valid");
        }
    }

    #[test]
    fn test_invalid_ids() {
        for id in ["", "Genesis", "book 1", "../etc", "book.json", "ծննդոց"] {
            assert_eq!(
                BookId::parse(id),
                Err(BookModelError::InvalidBookId(id.to_string()))
            );
        }
    }

    #[test]
    fn test_transparent_serialization() {
        let id = BookId::parse("exodus").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"exodus\"");
        let parsed: BookId = serde_json::from_str("\"exodus\"").unwrap();
        assert_eq!(parsed, id);
    }
}
