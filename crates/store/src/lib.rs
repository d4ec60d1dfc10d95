//! Store - Book persistence, autosave, and local preferences
//!
//! This crate defines the contract of the remote book store and its backends,
//! the retrying persistence client every call goes through, the debounced
//! autosave scheduler, and the locally persisted book order preference.

mod autosave;
mod catalog;
mod client;
mod error;
mod file_store;
#[cfg(feature = "http")]
mod http_store;
mod memory_store;
mod preferences;
mod storage;

#[cfg(test)]
mod test_support;

pub use autosave::*;
pub use catalog::*;
pub use client::*;
pub use error::*;
pub use file_store::*;
#[cfg(feature = "http")]
pub use http_store::*;
pub use memory_store::*;
pub use preferences::*;
pub use storage::*;
