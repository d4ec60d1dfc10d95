//! Chapter commands

use book_model::{move_item, Book, Chapter};
use std::sync::Arc;

/// Append an empty chapter numbered one past the highest existing number.
///
/// Returns the edited book and the new chapter's number.
pub fn add_chapter(book: &Book) -> (Book, u32) {
    let number = book.max_chapter_number() + 1;
    let mut chapters = book.chapters.clone();
    chapters.push(Arc::new(Chapter::new(number)));
    (book.with_chapters(chapters), number)
}

/// Move a chapter, then renumber every chapter by its new position.
///
/// `current` is the number of the chapter being viewed. The returned number
/// is where that same chapter ended up; it is `current` unchanged when no
/// chapter had that number. Returns `None` for invalid or equal indices.
pub fn reorder_chapters(book: &Book, from: usize, to: usize, current: u32) -> Option<(Book, u32)> {
    let viewed = book.chapter(current).cloned();
    let moved = move_item(&book.chapters, from, to)?;

    let mut next_current = current;
    let chapters = moved
        .into_iter()
        .enumerate()
        .map(|(index, chapter)| {
            let number = index as u32 + 1;
            if viewed.as_ref().is_some_and(|v| Arc::ptr_eq(v, &chapter)) {
                next_current = number;
            }
            if chapter.number == number {
                chapter
            } else {
                Arc::new(Chapter {
                    number,
                    content: chapter.content.clone(),
                })
            }
        })
        .collect();

    Some((book.with_chapters(chapters), next_current))
}
