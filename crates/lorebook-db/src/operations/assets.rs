//! Asset schema operations.

use crate::database::{BatchOutcome, Database};
use crate::error::{DbError, DbResult};
use crate::operations::search::{insert_search_entry, summarize};
use lorebook_core::{new_id, AssetField, AssetType, EntityKind, FieldType, SearchEntry, Source};
use rusqlite::{params, Connection};
use tracing::debug;

impl Database {
    /// Store asset types and their fields in one transaction.
    ///
    /// Both types and fields are insert-or-ignore: the first definition of
    /// (type, path) wins, so re-running on unchanged input writes nothing.
    /// Only fields that were actually inserted get a search index row.
    pub fn store_asset_types(
        &self,
        source: &Source,
        types: &[AssetType],
    ) -> DbResult<BatchOutcome> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut outcome = BatchOutcome::default();

        for asset_type in types {
            let type_id = ensure_asset_type(&tx, &source.id, asset_type)?;

            for field in &asset_type.fields {
                let field_id = new_id();
                let changed = tx.execute(
                    r#"
                    INSERT OR IGNORE INTO asset_fields
                        (id, asset_type_id, path, field_type, required, default_value,
                         enum_values, examples)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    "#,
                    params![
                        field_id,
                        type_id,
                        field.path,
                        field.field_type.as_str(),
                        field.required,
                        field.default_value,
                        serde_json::to_string(&field.enum_values)?,
                        serde_json::to_string(&field.examples)?,
                    ],
                )?;
                outcome.record(changed);

                if changed > 0 {
                    insert_search_entry(
                        &tx,
                        &SearchEntry {
                            kind: EntityKind::AssetField,
                            entity_id: field_id,
                            name: format!("{}.{}", asset_type.name, field.path),
                            source: source.name.clone(),
                            body: summarize(&format!(
                                "{} field {} ({}{})",
                                asset_type.name,
                                field.path,
                                field.field_type,
                                if field.required { ", required" } else { "" }
                            )),
                        },
                    )?;
                }
            }
        }

        tx.commit()?;
        debug!(
            "Stored {} asset fields ({} already known)",
            outcome.written, outcome.ignored
        );
        Ok(outcome)
    }

    /// List the stored fields of an asset type, ordered by path.
    pub fn list_asset_fields(&self, type_name: &str) -> DbResult<Vec<AssetField>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT f.path, f.field_type, f.required, f.default_value, f.enum_values, f.examples
            FROM asset_fields f
            INNER JOIN asset_types t ON t.id = f.asset_type_id
            WHERE t.name = ?1
            ORDER BY f.path
            "#,
        )?;

        let fields = stmt.query_map(params![type_name], |row| {
            let field_type: String = row.get(1)?;
            let enum_values: String = row.get(4)?;
            let examples: String = row.get(5)?;

            Ok(AssetField {
                path: row.get(0)?,
                field_type: FieldType::from_str(&field_type).unwrap_or(FieldType::Json),
                required: row.get(2)?,
                default_value: row.get(3)?,
                enum_values: serde_json::from_str(&enum_values).unwrap_or_default(),
                examples: serde_json::from_str(&examples).unwrap_or_default(),
            })
        })?;

        fields.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Count stored asset fields.
    pub fn count_asset_fields(&self) -> DbResult<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM asset_fields", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Insert the asset type if missing and return its id.
fn ensure_asset_type(
    conn: &Connection,
    source_id: &str,
    asset_type: &AssetType,
) -> DbResult<String> {
    conn.execute(
        r#"
        INSERT OR IGNORE INTO asset_types (id, source_id, name, extension, description, base_path)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            new_id(),
            source_id,
            asset_type.name,
            asset_type.extension,
            asset_type.description,
            asset_type.base_path,
        ],
    )?;

    let id = conn.query_row(
        "SELECT id FROM asset_types WHERE source_id = ?1 AND name = ?2",
        params![source_id, asset_type.name],
        |row| row.get(0),
    )?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(path: &str, field_type: FieldType, required: bool) -> AssetField {
        AssetField {
            path: path.to_string(),
            field_type,
            required,
            default_value: None,
            enum_values: vec![],
            examples: vec![],
        }
    }

    fn object_type(fields: Vec<AssetField>) -> AssetType {
        AssetType {
            name: "object".to_string(),
            extension: ".object".to_string(),
            description: "Placeable objects".to_string(),
            base_path: "/objects/".to_string(),
            fields,
        }
    }

    #[test]
    fn test_first_definition_wins() {
        let db = Database::open_in_memory().unwrap();
        let source = db.get_or_create_source(&Source::new("engine")).unwrap();

        let types = vec![object_type(vec![
            field("objectName", FieldType::String, true),
            field("objectName", FieldType::Json, false),
        ])];

        let outcome = db.store_asset_types(&source, &types).unwrap();
        assert_eq!(outcome, BatchOutcome { written: 1, ignored: 1 });

        let fields = db.list_asset_fields("object").unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field_type, FieldType::String);
        assert!(fields[0].required);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let source = db.get_or_create_source(&Source::new("engine")).unwrap();
        let types = vec![object_type(vec![
            field("objectName", FieldType::String, true),
            field("orientations", FieldType::Array, true),
        ])];

        db.store_asset_types(&source, &types).unwrap();
        let second = db.store_asset_types(&source, &types).unwrap();

        assert_eq!(second.written, 0);
        assert_eq!(db.count_asset_fields().unwrap(), 2);
        assert_eq!(db.search("orientations", None).unwrap().len(), 1);
    }
}
