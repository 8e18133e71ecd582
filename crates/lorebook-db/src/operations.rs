//! Database operations, one module per entity family.

pub mod api;
pub mod assets;
pub mod recipes;
pub mod research;
pub mod search;
pub mod sources;
pub mod stats;
