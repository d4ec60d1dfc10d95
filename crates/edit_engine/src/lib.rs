//! Edit Engine - Book mutations, snapshot history, and the editor session
//!
//! Mutations are pure functions from the current book to an edited copy,
//! grouped by concern. `EditorSession` wires them to the snapshot history and
//! the autosave scheduler from the `store` crate.

mod chapter_commands;
mod content_commands;
mod error;
mod footnote_commands;
mod poetry_commands;
mod session;
mod undo;

pub use chapter_commands::*;
pub use content_commands::*;
pub use error::*;
pub use footnote_commands::*;
pub use poetry_commands::*;
pub use session::*;
pub use undo::*;
