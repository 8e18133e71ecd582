//! Store statistics operations.

use crate::database::Database;
use crate::error::DbResult;
use lorebook_core::StoreStats;
use rusqlite::Connection;

fn count_rows(conn: &Connection, table: &str) -> DbResult<i64> {
    let count = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
    Ok(count)
}

impl Database {
    /// Get row counts for every record family plus the on-disk size.
    pub fn get_stats(&self) -> DbResult<StoreStats> {
        let conn = self.conn()?;

        // Database size (page_count * page_size)
        let page_count: i64 = conn.pragma_query_value(None, "page_count", |row| row.get(0))?;
        let page_size: i64 = conn.pragma_query_value(None, "page_size", |row| row.get(0))?;

        Ok(StoreStats {
            sources: count_rows(&conn, "sources")?,
            api_tables: count_rows(&conn, "api_tables")?,
            api_functions: count_rows(&conn, "api_functions")?,
            asset_types: count_rows(&conn, "asset_types")?,
            asset_fields: count_rows(&conn, "asset_fields")?,
            recipes: count_rows(&conn, "recipes")?,
            extraction_records: count_rows(&conn, "extraction_records")?,
            research_nodes: count_rows(&conn, "research_nodes")?,
            search_entries: count_rows(&conn, "search_index")?,
            database_size_bytes: page_count * page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorebook_core::{ItemCount, Recipe, Source};

    #[test]
    fn test_get_stats() {
        let db = Database::open_in_memory().unwrap();
        let source = db.get_or_create_source(&Source::new("base")).unwrap();

        let recipe = Recipe {
            output: ItemCount::new("torch", 1),
            station: None,
            groups: vec![],
            inputs: vec![ItemCount::new("coalore", 1)],
            duration: None,
            notes: None,
        };
        db.store_recipes(&source, &[recipe]).unwrap();

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.sources, 1);
        assert_eq!(stats.recipes, 1);
        assert_eq!(stats.search_entries, 1);
        assert_eq!(stats.api_functions, 0);
        assert!(stats.database_size_bytes > 0);
    }
}
