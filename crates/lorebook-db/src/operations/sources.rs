//! Source operations.

use crate::database::Database;
use crate::error::{DbError, DbResult};
use chrono::{DateTime, Utc};
use lorebook_core::Source;
use rusqlite::params;

impl Database {
    /// Create a new source.
    pub fn create_source(&self, source: &Source) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO sources (id, name, version, description, url, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                source.id,
                source.name,
                source.version,
                source.description,
                source.url,
                source.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a source by name.
    pub fn get_source_by_name(&self, name: &str) -> DbResult<Option<Source>> {
        let conn = self.conn()?;
        let result = conn.query_row(
            "SELECT id, name, version, description, url, created_at FROM sources WHERE name = ?1",
            params![name],
            row_to_source,
        );

        match result {
            Ok(source) => Ok(Some(source)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DbError::from(e)),
        }
    }

    /// Get or create a source by name.
    ///
    /// An existing source is returned as stored; the metadata of `template`
    /// only applies when the source is created.
    pub fn get_or_create_source(&self, template: &Source) -> DbResult<Source> {
        if let Some(source) = self.get_source_by_name(&template.name)? {
            return Ok(source);
        }

        self.create_source(template)?;
        Ok(template.clone())
    }

    /// List all sources.
    pub fn list_sources(&self) -> DbResult<Vec<Source>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, version, description, url, created_at FROM sources ORDER BY name",
        )?;

        let sources = stmt.query_map([], row_to_source)?;
        sources.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }
}

fn row_to_source(row: &rusqlite::Row) -> rusqlite::Result<Source> {
    let created_at_str: String = row.get(5)?;

    Ok(Source {
        id: row.get(0)?,
        name: row.get(1)?,
        version: row.get(2)?,
        description: row.get(3)?,
        url: row.get(4)?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_is_idempotent() {
        let db = Database::open_in_memory().unwrap();

        let first = db
            .get_or_create_source(&Source::new("base").with_version("1.0"))
            .unwrap();
        let second = db
            .get_or_create_source(&Source::new("base").with_version("2.0"))
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.version, Some("1.0".to_string()));
        assert_eq!(db.list_sources().unwrap().len(), 1);
    }

    #[test]
    fn test_get_missing_source() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_source_by_name("nope").unwrap().is_none());
    }
}
