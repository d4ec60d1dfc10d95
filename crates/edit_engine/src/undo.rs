//! Snapshot-based undo/redo
//!
//! History is kept as whole-book snapshots rather than inverse commands. Every
//! snapshot is a detached deep copy, so nothing the editor holds can alias a
//! stored entry, and every book handed back is the stack's own copy.

use book_model::Book;
use std::collections::VecDeque;

/// Default number of retained undo entries
pub const DEFAULT_SNAPSHOT_CAPACITY: usize = 50;

/// Manages the past and future snapshot stacks
#[derive(Debug, Clone)]
pub struct SnapshotStack {
    /// Books before each applied mutation, oldest first
    past: VecDeque<Book>,
    /// Books undone, most recently undone last
    future: Vec<Book>,
    /// Maximum number of past entries
    capacity: usize,
}

impl SnapshotStack {
    /// Create a stack with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SNAPSHOT_CAPACITY)
    }

    /// Create with a custom capacity (at least one entry)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record the book as it was before a mutation.
    ///
    /// Clears redo history; history does not branch.
    pub fn push_snapshot(&mut self, book: &Book) {
        self.future.clear();
        self.push_past(book.detached());
    }

    fn push_past(&mut self, book: Book) {
        self.past.push_back(book);
        while self.past.len() > self.capacity {
            self.past.pop_front();
        }
    }

    /// Step back. Returns `None` when there is nothing to undo.
    pub fn undo(&mut self, current: &Book) -> Option<Book> {
        let previous = self.past.pop_back()?;
        self.future.push(current.detached());
        Some(previous)
    }

    /// Step forward. Returns `None` when there is nothing to redo.
    pub fn redo(&mut self, current: &Book) -> Option<Book> {
        let next = self.future.pop()?;
        self.push_past(current.detached());
        Some(next)
    }

    /// Check if undo is available
    pub fn has_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Check if redo is available
    pub fn has_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

impl Default for SnapshotStack {
    fn default() -> Self {
        Self::new()
    }
}
