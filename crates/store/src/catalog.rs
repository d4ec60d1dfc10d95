//! Book catalog
//!
//! The list of stored books as shown to the user: summaries ordered by the
//! saved display preference, drag reordering that persists the new order, and
//! creation of new books with generated ids.

use crate::{BookOrderPreference, BookStore, PersistenceClient, Result, StoreError};
use book_model::{move_item, Book, BookId, BookName, BookSummary};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Fallback id when a seed normalizes to nothing
const FALLBACK_BOOK_ID: &str = "book";

/// Order summaries by a preferred id list.
///
/// Ranked books come first in list order. Unranked books follow, sorted by
/// English name.
pub fn apply_book_order(list: &[BookSummary], preferred: &[String]) -> Vec<BookSummary> {
    let rank: HashMap<&str, usize> = preferred
        .iter()
        .enumerate()
        .map(|(idx, id)| (id.as_str(), idx))
        .collect();

    let mut ordered = list.to_vec();
    ordered.sort_by(|a, b| {
        match (rank.get(a.id.as_str()), rank.get(b.id.as_str())) {
            (Some(a_rank), Some(b_rank)) => a_rank.cmp(b_rank),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => compare_names(&a.name.english, &b.name.english),
        }
    });
    ordered
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Move one summary; `None` for out-of-range or equal indices
pub fn reorder_books(list: &[BookSummary], from: usize, to: usize) -> Option<Vec<BookSummary>> {
    move_item(list, from, to)
}

/// Normalize a seed into the book id alphabet.
///
/// Lowercases, collapses every run of other characters into `-`, and trims
/// leading and trailing dashes.
pub fn make_book_id(seed: &str) -> String {
    let mut id = String::with_capacity(seed.len());
    let mut pending_dash = false;
    for ch in seed.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !id.is_empty() {
                id.push('-');
            }
            pending_dash = false;
            id.push(ch);
        } else {
            pending_dash = true;
        }
    }

    if id.is_empty() {
        FALLBACK_BOOK_ID.to_string()
    } else {
        id
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.iter().rev().map(|&d| d as char).collect()
}

/// Derive a fresh id `book-<base36 millis>`, suffixed `-2`, `-3`, ... until
/// it collides with none of `existing`.
pub fn new_book_id<'a>(
    existing: impl IntoIterator<Item = &'a BookId>,
    now_millis: u64,
) -> Result<BookId> {
    let taken: HashSet<&str> = existing.into_iter().map(BookId::as_str).collect();
    let base = make_book_id(&format!("book-{}", to_base36(now_millis)));

    let mut candidate = base.clone();
    let mut suffix = 2;
    while taken.contains(candidate.as_str()) {
        candidate = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    BookId::parse(candidate.as_str()).map_err(|_| StoreError::InvalidId(candidate))
}

fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

/// Ordered list of stored books
pub struct BookCatalog<S> {
    client: PersistenceClient<S>,
    preference: BookOrderPreference,
    books: Vec<BookSummary>,
}

impl<S: BookStore> BookCatalog<S> {
    pub fn new(client: PersistenceClient<S>, preference: BookOrderPreference) -> Self {
        Self {
            client,
            preference,
            books: Vec::new(),
        }
    }

    /// Summaries in display order
    pub fn books(&self) -> &[BookSummary] {
        &self.books
    }

    pub fn contains(&self, id: &BookId) -> bool {
        self.books.iter().any(|summary| &summary.id == id)
    }

    /// Reload summaries from the store and apply the saved order
    pub async fn refresh(&mut self) -> Result<&[BookSummary]> {
        let listed = self.client.list_books().await?;
        let preferred = self.preference.load().await;
        self.books = apply_book_order(&listed, &preferred);
        Ok(&self.books)
    }

    /// Move a book in the display order and persist the new order.
    ///
    /// Returns `false` without persisting when the indices are out of range or equal.
    pub async fn reorder(&mut self, from: usize, to: usize) -> Result<bool> {
        let Some(next) = reorder_books(&self.books, from, to) else {
            return Ok(false);
        };
        self.books = next;
        self.persist_order().await?;
        Ok(true)
    }

    /// Create an empty book with a generated id and a placeholder name
    pub async fn create_book(&mut self) -> Result<Book> {
        let id = new_book_id(self.books.iter().map(|summary| &summary.id), now_millis())?;
        let label = format!("Book {}", self.books.len() + 1);
        let book = Book::new_empty(id, BookName::uniform(label));

        self.client.create_book(&book).await?;
        tracing::info!("Created book {}", book.id);

        self.books.push(book.summary());
        self.persist_order().await?;
        Ok(book)
    }

    /// Soft-delete a book and drop it from the display order
    pub async fn delete_book(&mut self, id: &BookId) -> Result<()> {
        self.client.delete_book(id).await?;
        self.books.retain(|summary| &summary.id != id);
        self.persist_order().await
    }

    /// Refresh one summary after its book was edited
    pub fn update_summary(&mut self, book: &Book) {
        if let Some(summary) = self.books.iter_mut().find(|summary| summary.id == book.id) {
            *summary = book.summary();
        }
    }

    async fn persist_order(&self) -> Result<()> {
        let ids: Vec<BookId> = self.books.iter().map(|summary| summary.id.clone()).collect();
        self.preference.save(&ids).await
    }
}
