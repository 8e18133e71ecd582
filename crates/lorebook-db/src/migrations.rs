//! Database migrations and schema management.

use crate::error::{DbError, DbResult};
use rusqlite::Connection;
use tracing::info;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema.
pub fn initialize_schema(conn: &Connection) -> DbResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating initial database schema...");
        create_initial_schema(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version > SCHEMA_VERSION {
        return Err(DbError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current_version, SCHEMA_VERSION
        )));
    }

    Ok(())
}

fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> DbResult<()> {
    conn.pragma_update(None, "user_version", version)?;
    Ok(())
}

fn create_initial_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- Named origins of extracted data
        CREATE TABLE IF NOT EXISTS sources (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            version TEXT,
            description TEXT,
            url TEXT,
            created_at TEXT NOT NULL
        );

        -- Scripting API reference
        CREATE TABLE IF NOT EXISTS api_tables (
            id TEXT PRIMARY KEY,
            source_id TEXT NOT NULL REFERENCES sources(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            context TEXT NOT NULL,
            UNIQUE (source_id, name)
        );

        CREATE TABLE IF NOT EXISTS api_functions (
            id TEXT PRIMARY KEY,
            table_id TEXT NOT NULL REFERENCES api_tables(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            signature TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            return_type TEXT NOT NULL,
            params TEXT NOT NULL DEFAULT '[]',
            examples TEXT NOT NULL DEFAULT '[]',
            notes TEXT,
            provenance TEXT NOT NULL DEFAULT '[]',
            UNIQUE (table_id, name)
        );

        CREATE INDEX IF NOT EXISTS idx_api_functions_name ON api_functions(name);

        -- Recovered asset schemas
        CREATE TABLE IF NOT EXISTS asset_types (
            id TEXT PRIMARY KEY,
            source_id TEXT NOT NULL REFERENCES sources(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            extension TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            base_path TEXT NOT NULL DEFAULT '',
            UNIQUE (source_id, name)
        );

        CREATE TABLE IF NOT EXISTS asset_fields (
            id TEXT PRIMARY KEY,
            asset_type_id TEXT NOT NULL REFERENCES asset_types(id) ON DELETE CASCADE,
            path TEXT NOT NULL,
            field_type TEXT NOT NULL,
            required INTEGER NOT NULL DEFAULT 0,
            default_value TEXT,
            enum_values TEXT NOT NULL DEFAULT '[]',
            examples TEXT NOT NULL DEFAULT '[]',
            UNIQUE (asset_type_id, path)
        );

        -- Crafting and transformation data
        CREATE TABLE IF NOT EXISTS recipes (
            id TEXT PRIMARY KEY,
            source_id TEXT NOT NULL REFERENCES sources(id) ON DELETE CASCADE,
            output_item TEXT NOT NULL,
            output_count INTEGER NOT NULL DEFAULT 1,
            station TEXT,
            craft_groups TEXT NOT NULL DEFAULT '[]',
            inputs TEXT NOT NULL DEFAULT '[]',
            duration REAL,
            notes TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_recipes_output ON recipes(output_item);

        CREATE TABLE IF NOT EXISTS extraction_records (
            id TEXT PRIMARY KEY,
            source_id TEXT NOT NULL REFERENCES sources(id) ON DELETE CASCADE,
            input_item TEXT NOT NULL,
            input_count INTEGER NOT NULL DEFAULT 1,
            co_inputs TEXT NOT NULL DEFAULT '[]',
            method TEXT NOT NULL,
            outputs TEXT NOT NULL DEFAULT '[]'
        );

        CREATE INDEX IF NOT EXISTS idx_extraction_input ON extraction_records(input_item);
        CREATE INDEX IF NOT EXISTS idx_extraction_method ON extraction_records(method);

        -- Research trees (prerequisites are derived)
        CREATE TABLE IF NOT EXISTS research_nodes (
            id TEXT PRIMARY KEY,
            source_id TEXT NOT NULL REFERENCES sources(id) ON DELETE CASCADE,
            tree_id TEXT NOT NULL,
            node_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            cost TEXT NOT NULL DEFAULT '[]',
            prerequisites TEXT NOT NULL DEFAULT '[]',
            unlocks TEXT NOT NULL DEFAULT '[]',
            UNIQUE (tree_id, node_id)
        );

        -- Append-only full-text index over every stored record
        CREATE VIRTUAL TABLE IF NOT EXISTS search_index USING fts5(
            entity_kind UNINDEXED,
            entity_id UNINDEXED,
            name,
            source UNINDEXED,
            body
        );

        PRAGMA foreign_keys = ON;
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_sets_version() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);

        // Idempotent on an up-to-date schema
        initialize_schema(&conn).unwrap();
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        set_schema_version(&conn, SCHEMA_VERSION + 1).unwrap();
        assert!(matches!(
            initialize_schema(&conn),
            Err(DbError::Migration(_))
        ));
    }
}
