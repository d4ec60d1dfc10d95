//! Editor session
//!
//! `EditorSession` owns everything that lives as long as one open book: the
//! live book value, the chapter being viewed, the snapshot history and the
//! autosave scheduler. Every edit goes through `apply`, which snapshots the
//! previous book, installs the new one and schedules a save, or does nothing
//! at all when the edit was a no-op.
//!
//! Edits and undo/redo schedule autosaves with `tokio::spawn`, so they must be
//! called from within a Tokio runtime unless autosave is disabled.

use crate::{
    chapter_commands, content_commands, footnote_commands, poetry_commands, EditError, Result,
    SnapshotStack,
};
use book_model::{Book, BookId, Chapter, Language, WordFootnote};
use std::collections::BTreeMap;
use std::sync::Arc;
use store::{
    AutosaveConfig, AutosaveScheduler, BookCatalog, BookStore, PersistenceClient, SaveStatus,
};

/// State of one editing session
pub struct EditorSession<S> {
    /// Live book; replaced wholesale on every edit
    book: Option<Arc<Book>>,
    /// Number of the chapter being viewed
    current_chapter: u32,
    history: SnapshotStack,
    autosave: AutosaveScheduler<S>,
}

impl<S: BookStore + 'static> EditorSession<S> {
    /// Create a session with no open book
    pub fn new(client: PersistenceClient<S>, config: AutosaveConfig) -> Self {
        Self::with_autosave(AutosaveScheduler::new(client, config))
    }

    /// Create a session around an existing scheduler
    pub fn with_autosave(autosave: AutosaveScheduler<S>) -> Self {
        Self {
            book: None,
            current_chapter: 1,
            history: SnapshotStack::new(),
            autosave,
        }
    }

    /// Replace the snapshot history, e.g. to change its capacity
    pub fn with_history(mut self, history: SnapshotStack) -> Self {
        self.history = history;
        self
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Get the open book
    pub fn book(&self) -> Option<&Arc<Book>> {
        self.book.as_ref()
    }

    pub fn current_chapter(&self) -> u32 {
        self.current_chapter
    }

    /// View another chapter. Returns `false` if the book has no such chapter.
    pub fn set_current_chapter(&mut self, number: u32) -> bool {
        let exists = self
            .book
            .as_ref()
            .is_some_and(|book| book.chapter(number).is_some());
        if exists {
            self.current_chapter = number;
        }
        exists
    }

    /// The chapter being viewed
    pub fn current_chapter_data(&self) -> Option<&Chapter> {
        self.book
            .as_ref()?
            .chapter(self.current_chapter)
            .map(Arc::as_ref)
    }

    /// Chapter numbers of the open book, in order
    pub fn chapter_numbers(&self) -> Vec<u32> {
        self.book
            .as_ref()
            .map(|book| book.chapter_numbers())
            .unwrap_or_default()
    }

    /// Poetry indentation of a chapter, recomputed on every call
    pub fn poetry_indents(&self, chapter: u32) -> BTreeMap<usize, bool> {
        self.book
            .as_ref()
            .and_then(|book| book.chapter(chapter))
            .map(|ch| poetry_commands::compute_poetry_indents(&ch.content))
            .unwrap_or_default()
    }

    pub fn can_undo(&self) -> bool {
        self.history.has_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.has_redo()
    }

    pub fn autosave(&self) -> &AutosaveScheduler<S> {
        &self.autosave
    }

    pub fn save_status(&self) -> SaveStatus {
        self.autosave.status()
    }

    pub fn is_dirty(&self) -> bool {
        self.autosave.is_dirty()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start editing `book` with fresh history. The previous book is dropped
    /// without saving; use `close` first to flush it.
    pub fn open(&mut self, book: Book) {
        self.history.clear();
        self.current_chapter = book.chapters.first().map_or(1, |chapter| chapter.number);
        let book = Arc::new(book);
        self.autosave.reset(Some(Arc::clone(&book)));
        tracing::debug!("Opened book {}", book.id);
        self.book = Some(book);
    }

    /// Close the open book, then fetch and open `id`
    pub async fn load(&mut self, id: &BookId) -> Result<()> {
        self.close().await?;
        let book = self.autosave.client().fetch_book(id).await?;
        self.open(book);
        Ok(())
    }

    /// Close the open book, create a new one through the catalog and open it
    pub async fn create_book(&mut self, catalog: &mut BookCatalog<S>) -> Result<BookId> {
        self.close().await?;
        let book = catalog.create_book().await?;
        let id = book.id.clone();
        self.open(book);
        Ok(id)
    }

    /// Flush unsaved edits and close the book.
    ///
    /// If the flush fails the book stays open and the error is returned.
    pub async fn close(&mut self) -> Result<()> {
        if self.book.is_none() {
            return Ok(());
        }
        if self.autosave.is_dirty() {
            self.autosave.force_save().await?;
        }
        self.autosave.reset(None);
        self.history.clear();
        if let Some(book) = self.book.take() {
            tracing::debug!("Closed book {}", book.id);
        }
        self.current_chapter = 1;
        Ok(())
    }

    /// Cancel the pending autosave and save now
    pub async fn force_save(&self) -> Result<()> {
        if self.book.is_none() {
            return Err(EditError::NoOpenBook);
        }
        self.autosave.force_save().await?;
        Ok(())
    }

    // =========================================================================
    // Edit pipeline
    // =========================================================================

    /// Run one edit against the live book.
    ///
    /// When `edit` returns a new book, the previous one is pushed onto the
    /// history, the new one is installed and an autosave is scheduled.
    /// Returns whether the book changed.
    pub fn apply(&mut self, edit: impl FnOnce(&Book) -> Option<Book>) -> bool {
        let Some(current) = self.book.as_ref() else {
            tracing::debug!("No open book, ignoring edit");
            return false;
        };
        let Some(next) = edit(current.as_ref()) else {
            tracing::debug!("Edit left book {} unchanged", current.id);
            return false;
        };

        self.history.push_snapshot(current);
        self.install(next);
        true
    }

    fn install(&mut self, book: Book) {
        let book = Arc::new(book);
        if book.chapter(self.current_chapter).is_none() {
            self.current_chapter = book.chapters.first().map_or(1, |chapter| chapter.number);
        }
        self.autosave.schedule(Arc::clone(&book));
        self.book = Some(book);
    }

    /// Restore the book as it was before the last edit
    pub fn undo(&mut self) -> bool {
        let Some(current) = self.book.as_ref() else {
            return false;
        };
        let Some(previous) = self.history.undo(current) else {
            return false;
        };
        tracing::debug!("Undo in book {}", previous.id);
        self.install(previous);
        true
    }

    /// Re-apply the last undone edit
    pub fn redo(&mut self) -> bool {
        let Some(current) = self.book.as_ref() else {
            return false;
        };
        let Some(next) = self.history.redo(current) else {
            return false;
        };
        tracing::debug!("Redo in book {}", next.id);
        self.install(next);
        true
    }

    // =========================================================================
    // Content
    // =========================================================================

    pub fn update_verse(&mut self, chapter: u32, verse: u32, lang: Language, value: &str) -> bool {
        self.apply(|book| content_commands::update_verse(book, chapter, verse, lang, value))
    }

    pub fn update_heading(
        &mut self,
        chapter: u32,
        index: usize,
        lang: Language,
        value: &str,
    ) -> bool {
        self.apply(|book| content_commands::update_heading(book, chapter, index, lang, value))
    }

    pub fn insert_verse_after(&mut self, chapter: u32, after: isize) -> bool {
        self.apply(|book| content_commands::insert_verse_after(book, chapter, after))
    }

    pub fn insert_heading_after(&mut self, chapter: u32, after: isize) -> bool {
        self.apply(|book| content_commands::insert_heading_after(book, chapter, after))
    }

    pub fn delete_item_at(&mut self, chapter: u32, index: usize) -> bool {
        self.apply(|book| content_commands::delete_item_at(book, chapter, index))
    }

    pub fn reorder_content(&mut self, chapter: u32, from: usize, to: usize) -> bool {
        self.apply(|book| content_commands::reorder_content(book, chapter, from, to))
    }

    // =========================================================================
    // Poetry
    // =========================================================================

    pub fn toggle_verse_poetry(&mut self, chapter: u32, verse: u32) -> bool {
        self.apply(|book| poetry_commands::toggle_verse_poetry(book, chapter, verse))
    }

    pub fn set_chapter_poetry(&mut self, chapter: u32, value: bool) -> bool {
        self.apply(|book| poetry_commands::set_chapter_poetry(book, chapter, value))
    }

    pub fn set_section_poetry(
        &mut self,
        chapter: u32,
        heading_index: Option<usize>,
        value: bool,
    ) -> bool {
        self.apply(|book| poetry_commands::set_section_poetry(book, chapter, heading_index, value))
    }

    // =========================================================================
    // Footnotes
    // =========================================================================

    pub fn update_footnotes(
        &mut self,
        chapter: u32,
        verse: u32,
        lang: Language,
        edit: impl FnOnce(Vec<WordFootnote>) -> Vec<WordFootnote>,
    ) -> bool {
        self.apply(|book| footnote_commands::update_footnotes(book, chapter, verse, lang, edit))
    }

    pub fn reorder_footnotes(
        &mut self,
        chapter: u32,
        verse: u32,
        lang: Language,
        from: usize,
        to: usize,
    ) -> bool {
        self.apply(|book| {
            footnote_commands::reorder_footnotes(book, chapter, verse, lang, from, to)
        })
    }

    /// Add a footnote, returning its id
    pub fn add_footnote(
        &mut self,
        chapter: u32,
        verse: u32,
        lang: Language,
        text: &str,
        anchor_word: u32,
    ) -> Option<String> {
        let mut added = None;
        self.apply(|book| {
            let (next, id) =
                footnote_commands::add_footnote(book, chapter, verse, lang, text, anchor_word)?;
            added = Some(id);
            Some(next)
        });
        added
    }

    pub fn edit_footnote_text(
        &mut self,
        chapter: u32,
        verse: u32,
        lang: Language,
        id: &str,
        text: &str,
    ) -> bool {
        self.apply(|book| {
            footnote_commands::edit_footnote_text(book, chapter, verse, lang, id, text)
        })
    }

    pub fn set_footnote_anchor(
        &mut self,
        chapter: u32,
        verse: u32,
        lang: Language,
        id: &str,
        anchor_word: u32,
    ) -> bool {
        self.apply(|book| {
            footnote_commands::set_footnote_anchor(book, chapter, verse, lang, id, anchor_word)
        })
    }

    pub fn remove_footnote(&mut self, chapter: u32, verse: u32, lang: Language, id: &str) -> bool {
        self.apply(|book| footnote_commands::remove_footnote(book, chapter, verse, lang, id))
    }

    // =========================================================================
    // Chapters
    // =========================================================================

    /// Append a chapter and view it. Returns its number.
    pub fn add_chapter(&mut self) -> Option<u32> {
        let mut added = None;
        self.apply(|book| {
            let (next, number) = chapter_commands::add_chapter(book);
            added = Some(number);
            Some(next)
        });
        if let Some(number) = added {
            self.current_chapter = number;
        }
        added
    }

    /// Move a chapter; the viewed chapter is followed to its new number
    pub fn reorder_chapters(&mut self, from: usize, to: usize) -> bool {
        let current = self.current_chapter;
        let mut next_current = None;
        let changed = self.apply(|book| {
            let (next, number) = chapter_commands::reorder_chapters(book, from, to, current)?;
            next_current = Some(number);
            Some(next)
        });
        if let Some(number) = next_current {
            self.current_chapter = number;
        }
        changed
    }
}
