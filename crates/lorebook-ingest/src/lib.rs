//! Lorebook Ingest - Extraction pipeline feeding the knowledge store.
//!
//! This crate provides:
//! - Comment-aware JSON sanitizing
//! - Function-signature extraction from Markdown references
//! - Heuristic field-type recovery from engine sources
//! - Recipe, transformation table and research tree extraction
//! - The `Ingestor` that writes extracted records in batches

pub mod discovery;
mod error;
pub mod fields;
mod ingestor;
pub mod markdown;
pub mod recipes;
pub mod sanitize;

pub use error::{IngestError, IngestResult};
pub use ingestor::{
    extract_api, extract_assets, extract_recipes, ApiExtraction, AssetExtraction, Ingestor,
    RecipeExtraction, RunReport,
};
