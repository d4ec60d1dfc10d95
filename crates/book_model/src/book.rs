//! Book root, chapters and the listing summary

use crate::{BookId, BookName, ContentItem, Verse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A chapter: an ordered mix of verses and headings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// 1-based position of the chapter in its book
    pub number: u32,
    /// Content in display order
    pub content: Vec<Arc<ContentItem>>,
}

impl Chapter {
    /// Create an empty chapter
    pub fn new(number: u32) -> Self {
        Self {
            number,
            content: Vec::new(),
        }
    }

    /// Create a chapter from owned items
    pub fn with_items(number: u32, items: impl IntoIterator<Item = ContentItem>) -> Self {
        Self {
            number,
            content: items.into_iter().map(Arc::new).collect(),
        }
    }

    /// Copy of this chapter holding different content
    pub fn with_content(&self, content: Vec<Arc<ContentItem>>) -> Self {
        Self {
            number: self.number,
            content,
        }
    }

    /// Number of content items (verses and headings)
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Iterate over the verses in order
    pub fn verses(&self) -> impl Iterator<Item = &Verse> {
        self.content.iter().filter_map(|item| item.as_verse())
    }

    /// Number of verses
    pub fn verse_count(&self) -> usize {
        self.verses().count()
    }

    /// Find a verse by number, returning its content index
    pub fn find_verse(&self, number: u32) -> Option<(usize, &Verse)> {
        self.content
            .iter()
            .enumerate()
            .find_map(|(index, item)| match item.as_verse() {
                Some(verse) if verse.number == number => Some((index, verse)),
                _ => None,
            })
    }
}

/// A complete multilingual book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub name: BookName,
    pub chapters: Vec<Arc<Chapter>>,
}

impl Book {
    /// Create a book with a single empty chapter numbered 1
    pub fn new_empty(id: BookId, name: BookName) -> Self {
        Self {
            id,
            name,
            chapters: vec![Arc::new(Chapter::new(1))],
        }
    }

    /// Look up a chapter by number
    pub fn chapter(&self, number: u32) -> Option<&Arc<Chapter>> {
        self.chapters.iter().find(|chapter| chapter.number == number)
    }

    /// Position of a chapter in the book, looked up by number
    pub fn chapter_index(&self, number: u32) -> Option<usize> {
        self.chapters.iter().position(|chapter| chapter.number == number)
    }

    /// Chapter numbers in book order
    pub fn chapter_numbers(&self) -> Vec<u32> {
        self.chapters.iter().map(|chapter| chapter.number).collect()
    }

    /// Highest chapter number, or 0 for a book without chapters
    pub fn max_chapter_number(&self) -> u32 {
        self.chapters.iter().map(|chapter| chapter.number).max().unwrap_or(0)
    }

    /// Copy of this book holding a different chapter list
    pub fn with_chapters(&self, chapters: Vec<Arc<Chapter>>) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            chapters,
        }
    }

    /// Rebuild the path to one chapter.
    ///
    /// `edit` receives the current chapter and returns its replacement, or
    /// `None` to leave the book untouched. Every other chapter keeps sharing
    /// its allocation with `self`. Returns `None` when the chapter is absent or
    /// `edit` declined.
    pub fn update_chapter(
        &self,
        number: u32,
        edit: impl FnOnce(&Chapter) -> Option<Chapter>,
    ) -> Option<Book> {
        let index = self.chapter_index(number)?;
        let replacement = edit(&self.chapters[index])?;
        let mut chapters = self.chapters.clone();
        chapters[index] = Arc::new(replacement);
        Some(self.with_chapters(chapters))
    }

    /// Deep copy that shares no allocation with `self`
    pub fn detached(&self) -> Book {
        let chapters = self
            .chapters
            .iter()
            .map(|chapter| {
                Arc::new(Chapter {
                    number: chapter.number,
                    content: chapter
                        .content
                        .iter()
                        .map(|item| Arc::new(ContentItem::clone(item)))
                        .collect(),
                })
            })
            .collect();
        self.with_chapters(chapters)
    }

    /// Listing projection
    pub fn summary(&self) -> BookSummary {
        BookSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            chapter_count: self.chapters.len(),
        }
    }
}

/// Move one element of a slice to a new index.
///
/// Returns `None` when either index is out of range or both are equal, so
/// callers can treat the result as "nothing changed".
pub fn move_item<T: Clone>(items: &[T], from: usize, to: usize) -> Option<Vec<T>> {
    if from >= items.len() || to >= items.len() || from == to {
        return None;
    }
    let mut moved = items.to_vec();
    let item = moved.remove(from);
    moved.insert(to, item);
    Some(moved)
}

/// Projection of a book used for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub id: BookId,
    pub name: BookName,
    pub chapter_count: usize,
}
