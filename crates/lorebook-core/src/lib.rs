//! Lorebook Core - Domain types shared by the extraction pipeline and the store.

mod types;

pub use types::*;
