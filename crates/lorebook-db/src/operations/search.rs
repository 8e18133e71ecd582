//! Full-text search index operations.

use crate::database::Database;
use crate::error::{DbError, DbResult};
use lorebook_core::{EntityKind, SearchEntry};
use rusqlite::{params, Connection};

/// A search result row.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub kind: Option<EntityKind>,
    pub entity_id: String,
    pub name: String,
    pub source: String,
    pub body: String,
}

/// Longest body stored for one index row, in characters.
const SUMMARY_MAX_CHARS: usize = 240;

/// Collapse whitespace and cut `text` down to a short index summary.
pub(crate) fn summarize(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= SUMMARY_MAX_CHARS {
        return collapsed;
    }
    let mut cut: String = collapsed.chars().take(SUMMARY_MAX_CHARS).collect();
    cut.push_str("...");
    cut
}

/// Append one row to the search index on an open connection or transaction.
pub(crate) fn insert_search_entry(conn: &Connection, entry: &SearchEntry) -> DbResult<()> {
    conn.execute(
        "INSERT INTO search_index (entity_kind, entity_id, name, source, body)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.kind.as_str(),
            entry.entity_id,
            entry.name,
            entry.source,
            entry.body,
        ],
    )?;
    Ok(())
}

/// Drop any rows for the entry's entity, then insert it.
pub(crate) fn replace_search_entry(conn: &Connection, entry: &SearchEntry) -> DbResult<()> {
    conn.execute(
        "DELETE FROM search_index WHERE entity_id = ?1",
        params![entry.entity_id],
    )?;
    insert_search_entry(conn, entry)
}

impl Database {
    /// Append a single row to the search index.
    pub fn append_search_entry(&self, entry: &SearchEntry) -> DbResult<()> {
        let conn = self.conn()?;
        insert_search_entry(&conn, entry)
    }

    /// Full-text search over the index, best matches first.
    pub fn search(&self, query: &str, limit: Option<i64>) -> DbResult<Vec<SearchHit>> {
        let conn = self.conn()?;
        let limit = limit.unwrap_or(20);

        let mut stmt = conn.prepare(
            r#"
            SELECT entity_kind, entity_id, name, source, body
            FROM search_index
            WHERE search_index MATCH ?1
            ORDER BY rank
            LIMIT ?2
            "#,
        )?;

        let hits = stmt.query_map(params![query, limit], |row| {
            let kind: String = row.get(0)?;
            Ok(SearchHit {
                kind: EntityKind::from_str(&kind),
                entity_id: row.get(1)?,
                name: row.get(2)?,
                source: row.get(3)?,
                body: row.get(4)?,
            })
        })?;

        hits.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Count index rows pointing at a given entity.
    pub fn count_search_entries_for(&self, entity_id: &str) -> DbResult<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM search_index WHERE entity_id = ?1",
            params![entity_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
