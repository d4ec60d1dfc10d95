//! Poetry layout commands
//!
//! Verses flagged as poetry are laid out as verse lines. Within a run of
//! consecutive poetry verses every second line is indented; the indentation is
//! derived from the content on each render and never stored.

use crate::content_commands::map_verses;
use book_model::{Book, ContentItem, Verse};
use std::collections::BTreeMap;
use std::sync::Arc;

fn with_poetry(verse: &Verse, poetry: bool) -> Verse {
    Verse {
        poetry,
        ..verse.clone()
    }
}

/// Flip the poetry flag of one verse
pub fn toggle_verse_poetry(book: &Book, chapter: u32, verse: u32) -> Option<Book> {
    book.update_chapter(chapter, |ch| {
        let (index, _) = ch.find_verse(verse)?;
        map_verses(ch, index..index + 1, |v| Some(with_poetry(v, !v.poetry)))
    })
}

/// Set the poetry flag of every verse in a chapter
pub fn set_chapter_poetry(book: &Book, chapter: u32, value: bool) -> Option<Book> {
    book.update_chapter(chapter, |ch| {
        map_verses(ch, 0..ch.len(), |v| Some(with_poetry(v, value)))
    })
}

/// Set the poetry flag of every verse in one section.
///
/// A section runs from just after the heading at `heading_index` up to the
/// next heading or the end of the chapter. `None` selects the untitled section
/// before the first heading.
pub fn set_section_poetry(
    book: &Book,
    chapter: u32,
    heading_index: Option<usize>,
    value: bool,
) -> Option<Book> {
    book.update_chapter(chapter, |ch| {
        let start = match heading_index {
            Some(index) => {
                ch.content.get(index)?.as_heading()?;
                index + 1
            }
            None => 0,
        };
        let end = ch.content[start..]
            .iter()
            .position(|item| item.is_heading())
            .map_or(ch.len(), |offset| start + offset);
        map_verses(ch, start..end, |v| Some(with_poetry(v, value)))
    })
}

/// Indentation of poetry verses by content index.
///
/// Only poetry verses get an entry. Headings and non-poetry verses end the
/// current run; the 2nd, 4th, ... verse of each run is indented.
pub fn compute_poetry_indents(content: &[Arc<ContentItem>]) -> BTreeMap<usize, bool> {
    let mut indents = BTreeMap::new();
    let mut run = 0;
    for (index, item) in content.iter().enumerate() {
        match item.as_ref() {
            ContentItem::Verse(verse) if verse.poetry => {
                run += 1;
                indents.insert(index, run % 2 == 0);
            }
            ContentItem::Verse(_) | ContentItem::Heading(_) => run = 0,
        }
    }
    indents
}
