//! Verse and heading commands
//!
//! Every command takes the current book and returns the edited copy, or
//! `None` when the arguments do not address anything or the edit would not
//! change the book. A `None` result must not be recorded as an undo step.
//!
//! Edits rebuild only the path to the changed item; untouched chapters and
//! items keep sharing their allocation with the input book.

use book_model::{move_item, renumber_verses, Book, Chapter, ContentItem, Heading, Language, Verse};
use std::ops::Range;
use std::sync::Arc;

// =============================================================================
// Helpers
// =============================================================================

/// Copy of a chapter with one item replaced
pub(crate) fn replace_item(chapter: &Chapter, index: usize, item: ContentItem) -> Chapter {
    let mut content = chapter.content.clone();
    content[index] = Arc::new(item);
    chapter.with_content(content)
}

/// Rewrite the verses of `range` with `edit`.
///
/// `edit` returns `None` to keep a verse as is. Returns `None` when no verse
/// changed.
pub(crate) fn map_verses(
    chapter: &Chapter,
    range: Range<usize>,
    mut edit: impl FnMut(&Verse) -> Option<Verse>,
) -> Option<Chapter> {
    let mut changed = false;
    let content = chapter
        .content
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let edited = match item.as_verse() {
                Some(verse) if range.contains(&index) => edit(verse),
                _ => None,
            };
            match edited {
                Some(verse) if item.as_verse() != Some(&verse) => {
                    changed = true;
                    Arc::new(ContentItem::Verse(verse))
                }
                _ => Arc::clone(item),
            }
        })
        .collect();
    changed.then(|| chapter.with_content(content))
}

/// Slot an item inserted "after index `after`" lands in
fn insertion_slot(chapter: &Chapter, after: isize) -> usize {
    let last = chapter.len() as isize - 1;
    (after.clamp(-1, last.max(-1)) + 1) as usize
}

// =============================================================================
// Field updates
// =============================================================================

/// Set one language of the verse numbered `verse`
pub fn update_verse(
    book: &Book,
    chapter: u32,
    verse: u32,
    lang: Language,
    value: &str,
) -> Option<Book> {
    book.update_chapter(chapter, |ch| {
        let (index, current) = ch.find_verse(verse)?;
        if current.text(lang) == value {
            return None;
        }
        let updated = current.clone().with_text(lang, value);
        Some(replace_item(ch, index, updated.into()))
    })
}

/// Set one language of the heading at content index `index`
pub fn update_heading(
    book: &Book,
    chapter: u32,
    index: usize,
    lang: Language,
    value: &str,
) -> Option<Book> {
    book.update_chapter(chapter, |ch| {
        let current = ch.content.get(index)?.as_heading()?;
        if current.text(lang) == value {
            return None;
        }
        let updated = current.clone().with_text(lang, value);
        Some(replace_item(ch, index, updated.into()))
    })
}

// =============================================================================
// Structure
// =============================================================================

/// Insert an empty verse after content index `after`.
///
/// `after` is clamped to `-1..=len-1`; `-1` inserts at the top. The new verse
/// takes the number following the closest verse above it, and every verse at
/// or above that number moves up by one.
pub fn insert_verse_after(book: &Book, chapter: u32, after: isize) -> Option<Book> {
    book.update_chapter(chapter, |ch| {
        let slot = insertion_slot(ch, after);
        let previous = ch.content[..slot]
            .iter()
            .rev()
            .find_map(|item| item.verse_number())
            .unwrap_or(0);
        let number = previous + 1;

        let mut content: Vec<Arc<ContentItem>> = ch
            .content
            .iter()
            .map(|item| match item.as_verse() {
                Some(verse) if verse.number >= number => Arc::new(ContentItem::Verse(Verse {
                    number: verse.number + 1,
                    ..verse.clone()
                })),
                _ => Arc::clone(item),
            })
            .collect();
        content.insert(slot, Arc::new(Verse::new(number).into()));
        Some(ch.with_content(content))
    })
}

/// Insert an empty heading after content index `after` (clamped like verses)
pub fn insert_heading_after(book: &Book, chapter: u32, after: isize) -> Option<Book> {
    book.update_chapter(chapter, |ch| {
        let slot = insertion_slot(ch, after);
        let mut content = ch.content.clone();
        content.insert(slot, Arc::new(Heading::new().into()));
        Some(ch.with_content(content))
    })
}

/// Remove the item at `index`, closing the gap in verse numbers
pub fn delete_item_at(book: &Book, chapter: u32, index: usize) -> Option<Book> {
    book.update_chapter(chapter, |ch| {
        let removed = ch.content.get(index)?.verse_number();
        let content = ch
            .content
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != index)
            .map(|(_, item)| match (removed, item.as_verse()) {
                (Some(gone), Some(verse)) if verse.number > gone => {
                    Arc::new(ContentItem::Verse(Verse {
                        number: verse.number - 1,
                        ..verse.clone()
                    }))
                }
                _ => Arc::clone(item),
            })
            .collect();
        Some(ch.with_content(content))
    })
}

/// Move an item, then renumber all verses of the chapter by position
pub fn reorder_content(book: &Book, chapter: u32, from: usize, to: usize) -> Option<Book> {
    book.update_chapter(chapter, |ch| {
        let moved = move_item(&ch.content, from, to)?;
        Some(ch.with_content(renumber_verses(&moved)))
    })
}
