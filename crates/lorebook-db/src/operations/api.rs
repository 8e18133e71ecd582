//! Scripting API operations.

use crate::database::{BatchOutcome, Database};
use crate::error::{DbError, DbResult};
use crate::operations::search::{replace_search_entry, summarize};
use lorebook_core::{new_id, ApiFunction, ApiTable, EntityKind, SearchEntry, Source};
use rusqlite::{params, Connection};
use tracing::debug;

impl Database {
    /// Store API tables and their functions in one transaction.
    ///
    /// Tables are insert-or-ignore by (source, name); functions are
    /// replaced by (table, name) in place, keeping the row id. Every written
    /// function has exactly one search index row.
    pub fn store_api_tables(
        &self,
        source: &Source,
        tables: &[ApiTable],
    ) -> DbResult<BatchOutcome> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut outcome = BatchOutcome::default();

        for table in tables {
            let table_id = ensure_api_table(&tx, &source.id, table)?;

            for function in &table.functions {
                let function_id: String = tx.query_row(
                    r#"
                    INSERT INTO api_functions
                        (id, table_id, name, signature, description, return_type,
                         params, examples, notes, provenance)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    ON CONFLICT (table_id, name) DO UPDATE SET
                        signature = excluded.signature,
                        description = excluded.description,
                        return_type = excluded.return_type,
                        params = excluded.params,
                        examples = excluded.examples,
                        notes = excluded.notes,
                        provenance = excluded.provenance
                    RETURNING id
                    "#,
                    params![
                        new_id(),
                        table_id,
                        function.name,
                        function.signature,
                        function.description,
                        function.return_type,
                        serde_json::to_string(&function.params)?,
                        serde_json::to_string(&function.examples)?,
                        function.notes,
                        serde_json::to_string(&function.provenance)?,
                    ],
                    |row| row.get(0),
                )?;
                outcome.record(1);

                replace_search_entry(
                    &tx,
                    &SearchEntry {
                        kind: EntityKind::ApiFunction,
                        entity_id: function_id,
                        name: function.qualified_name(),
                        source: source.name.clone(),
                        body: summarize(&format!(
                            "{} {}",
                            function.signature, function.description
                        )),
                    },
                )?;
            }
        }

        tx.commit()?;
        debug!(
            "Stored {} API functions across {} tables",
            outcome.written,
            tables.len()
        );
        Ok(outcome)
    }

    /// Get a stored function by table and function name.
    pub fn get_api_function(&self, table: &str, name: &str) -> DbResult<Option<ApiFunction>> {
        let conn = self.conn()?;
        let result = conn.query_row(
            r#"
            SELECT t.name, f.name, f.signature, f.description, f.return_type,
                   f.params, f.examples, f.notes, f.provenance
            FROM api_functions f
            INNER JOIN api_tables t ON t.id = f.table_id
            WHERE t.name = ?1 AND f.name = ?2
            "#,
            params![table, name],
            |row| {
                let params_str: String = row.get(5)?;
                let examples_str: String = row.get(6)?;
                let provenance_str: String = row.get(8)?;

                Ok(ApiFunction {
                    table: row.get(0)?,
                    name: row.get(1)?,
                    signature: row.get(2)?,
                    description: row.get(3)?,
                    return_type: row.get(4)?,
                    params: serde_json::from_str(&params_str).unwrap_or_default(),
                    examples: serde_json::from_str(&examples_str).unwrap_or_default(),
                    notes: row.get(7)?,
                    provenance: serde_json::from_str(&provenance_str).unwrap_or_default(),
                })
            },
        );

        match result {
            Ok(function) => Ok(Some(function)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DbError::from(e)),
        }
    }

    /// Get the context tag of a stored table.
    pub fn get_api_table_context(&self, table: &str) -> DbResult<Option<String>> {
        let conn = self.conn()?;
        let result = conn.query_row(
            "SELECT context FROM api_tables WHERE name = ?1",
            params![table],
            |row| row.get(0),
        );

        match result {
            Ok(context) => Ok(Some(context)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DbError::from(e)),
        }
    }

    /// Count stored API functions.
    pub fn count_api_functions(&self) -> DbResult<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM api_functions", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Insert the table if missing and return its id.
fn ensure_api_table(conn: &Connection, source_id: &str, table: &ApiTable) -> DbResult<String> {
    conn.execute(
        "INSERT OR IGNORE INTO api_tables (id, source_id, name, context) VALUES (?1, ?2, ?3, ?4)",
        params![new_id(), source_id, table.name, table.context],
    )?;

    let id = conn.query_row(
        "SELECT id FROM api_tables WHERE source_id = ?1 AND name = ?2",
        params![source_id, table.name],
        |row| row.get(0),
    )?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorebook_core::{ApiParam, Provenance};

    fn function(name: &str, params: Vec<ApiParam>) -> ApiFunction {
        ApiFunction {
            table: "world".to_string(),
            name: name.to_string(),
            signature: format!("world.{}()", name),
            description: "Does a thing".to_string(),
            return_type: "void".to_string(),
            params,
            examples: vec!["world.thing()".to_string()],
            notes: None,
            provenance: vec![Provenance {
                file: "world.md".to_string(),
                line: 3,
            }],
        }
    }

    #[test]
    fn test_store_and_fetch_function() {
        let db = Database::open_in_memory().unwrap();
        let source = db.get_or_create_source(&Source::new("docs")).unwrap();

        let mut table = ApiTable::new("world", "universal");
        table
            .functions
            .push(function("spawnItem", vec![ApiParam::new("position", "Vec2F", false)]));

        let outcome = db.store_api_tables(&source, &[table]).unwrap();
        assert_eq!(outcome.written, 1);

        let fetched = db.get_api_function("world", "spawnItem").unwrap().unwrap();
        assert_eq!(fetched.params.len(), 1);
        assert_eq!(fetched.provenance[0].line, 3);
        assert_eq!(db.get_api_table_context("world").unwrap(), Some("universal".to_string()));
    }

    #[test]
    fn test_rerun_replaces_function() {
        let db = Database::open_in_memory().unwrap();
        let source = db.get_or_create_source(&Source::new("docs")).unwrap();

        let mut first = ApiTable::new("world", "universal");
        first.functions.push(function("time", vec![]));
        db.store_api_tables(&source, &[first]).unwrap();

        let mut second = ApiTable::new("world", "universal");
        second
            .functions
            .push(function("time", vec![ApiParam::new("offset", "float", true)]));
        db.store_api_tables(&source, &[second]).unwrap();

        assert_eq!(db.count_api_functions().unwrap(), 1);
        let fetched = db.get_api_function("world", "time").unwrap().unwrap();
        assert_eq!(fetched.params.len(), 1);
    }

    #[test]
    fn test_rerun_search_hits_point_at_live_functions() {
        let db = Database::open_in_memory().unwrap();
        let source = db.get_or_create_source(&Source::new("docs")).unwrap();

        let mut table = ApiTable::new("world", "universal");
        table.functions.push(function("spawnItem", vec![]));
        db.store_api_tables(&source, &[table.clone()]).unwrap();
        db.store_api_tables(&source, &[table]).unwrap();

        let hits = db.search("thing", None).unwrap();
        assert_eq!(hits.len(), 1);

        let conn = db.conn().unwrap();
        let live: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM api_functions WHERE id = ?1",
                params![hits[0].entity_id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(live, 1);
    }
}
