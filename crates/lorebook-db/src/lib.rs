//! Lorebook DB - SQLite knowledge store written by the extraction pipeline.
//!
//! Each entity family has its own merge policy:
//! - sources: get-or-create by name
//! - API tables, asset types, asset fields: insert-or-ignore by key
//! - API functions, research nodes: insert-or-replace by key
//! - recipes, extraction records, search rows: append

mod database;
mod error;
mod migrations;
mod operations;

pub use database::{BatchOutcome, Database};
pub use error::{DbError, DbResult};
pub use operations::search::SearchHit;
