//! Book Model - Multilingual book structure and its invariants
//!
//! This crate provides the data model for the translation editor: a book made
//! of chapters, each holding an ordered mix of verses and headings carried in
//! three parallel language tracks. Values are immutable once built and share
//! unchanged subtrees through `Arc`, so edits only reallocate the changed path.

mod book;
mod book_id;
mod content;
mod error;
mod footnote;
mod language;

pub use book::*;
pub use book_id::*;
pub use content::*;
pub use error::*;
pub use footnote::*;
pub use language::*;
