//! Recipe and extraction record operations. Both families are append-only.

use crate::database::{BatchOutcome, Database};
use crate::error::{DbError, DbResult};
use crate::operations::search::{insert_search_entry, summarize};
use lorebook_core::{new_id, EntityKind, ExtractionRecord, ItemCount, Recipe, SearchEntry, Source};
use rusqlite::params;
use tracing::debug;

impl Database {
    /// Append recipes in one transaction.
    pub fn store_recipes(&self, source: &Source, recipes: &[Recipe]) -> DbResult<BatchOutcome> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut outcome = BatchOutcome::default();

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO recipes
                    (id, source_id, output_item, output_count, station, craft_groups,
                     inputs, duration, notes)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )?;

            for recipe in recipes {
                let recipe_id = new_id();
                let changed = stmt.execute(params![
                    recipe_id,
                    source.id,
                    recipe.output.item,
                    recipe.output.count,
                    recipe.station,
                    serde_json::to_string(&recipe.groups)?,
                    serde_json::to_string(&recipe.inputs)?,
                    recipe.duration,
                    recipe.notes,
                ])?;
                outcome.record(changed);

                insert_search_entry(
                    &tx,
                    &SearchEntry {
                        kind: EntityKind::Recipe,
                        entity_id: recipe_id,
                        name: recipe.output.item.clone(),
                        source: source.name.clone(),
                        body: summarize(&format!(
                            "{} x{} from {} at {}",
                            recipe.output.item,
                            recipe.output.count,
                            describe_items(&recipe.inputs),
                            recipe.station.as_deref().unwrap_or("any station")
                        )),
                    },
                )?;
            }
        }

        tx.commit()?;
        debug!("Stored {} recipes", outcome.written);
        Ok(outcome)
    }

    /// Append extraction records in one transaction.
    pub fn store_extraction_records(
        &self,
        source: &Source,
        records: &[ExtractionRecord],
    ) -> DbResult<BatchOutcome> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut outcome = BatchOutcome::default();

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO extraction_records
                    (id, source_id, input_item, input_count, co_inputs, method, outputs)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )?;

            for record in records {
                let record_id = new_id();
                let changed = stmt.execute(params![
                    record_id,
                    source.id,
                    record.input.item,
                    record.input.count,
                    serde_json::to_string(&record.co_inputs)?,
                    record.method,
                    serde_json::to_string(&record.outputs)?,
                ])?;
                outcome.record(changed);

                let outputs = record
                    .outputs
                    .iter()
                    .map(|o| o.item.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                insert_search_entry(
                    &tx,
                    &SearchEntry {
                        kind: EntityKind::Extraction,
                        entity_id: record_id,
                        name: record.input.item.clone(),
                        source: source.name.clone(),
                        body: summarize(&format!(
                            "{} via {} yields {}",
                            record.input.item, record.method, outputs
                        )),
                    },
                )?;
            }
        }

        tx.commit()?;
        debug!("Stored {} extraction records", outcome.written);
        Ok(outcome)
    }

    /// List recipes producing an item.
    pub fn list_recipes_for_output(&self, item: &str) -> DbResult<Vec<Recipe>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT output_item, output_count, station, craft_groups, inputs, duration, notes
            FROM recipes WHERE output_item = ?1
            "#,
        )?;

        let recipes = stmt.query_map(params![item], |row| {
            let groups: String = row.get(3)?;
            let inputs: String = row.get(4)?;

            Ok(Recipe {
                output: ItemCount::new(row.get::<_, String>(0)?, row.get(1)?),
                station: row.get(2)?,
                groups: serde_json::from_str(&groups).unwrap_or_default(),
                inputs: serde_json::from_str(&inputs).unwrap_or_default(),
                duration: row.get(5)?,
                notes: row.get(6)?,
            })
        })?;

        recipes.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// List extraction records consuming an item.
    pub fn list_extraction_records(&self, input_item: &str) -> DbResult<Vec<ExtractionRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT input_item, input_count, co_inputs, method, outputs
            FROM extraction_records WHERE input_item = ?1
            ORDER BY method
            "#,
        )?;

        let records = stmt.query_map(params![input_item], |row| {
            let co_inputs: String = row.get(2)?;
            let outputs: String = row.get(4)?;

            Ok(ExtractionRecord {
                input: ItemCount::new(row.get::<_, String>(0)?, row.get(1)?),
                co_inputs: serde_json::from_str(&co_inputs).unwrap_or_default(),
                method: row.get(3)?,
                outputs: serde_json::from_str(&outputs).unwrap_or_default(),
            })
        })?;

        records.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }
}

fn describe_items(items: &[ItemCount]) -> String {
    items
        .iter()
        .map(|i| format!("{} x{}", i.item, i.count))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorebook_core::ExtractionOutput;

    #[test]
    fn test_recipes_are_appended() {
        let db = Database::open_in_memory().unwrap();
        let source = db.get_or_create_source(&Source::new("base")).unwrap();

        let recipe = Recipe {
            output: ItemCount::new("torch", 2),
            station: Some("plain".to_string()),
            groups: vec!["plain".to_string(), "all".to_string()],
            inputs: vec![ItemCount::new("coalore", 1), ItemCount::new("logblock", 1)],
            duration: Some(0.1),
            notes: None,
        };

        db.store_recipes(&source, &[recipe.clone()]).unwrap();
        db.store_recipes(&source, &[recipe]).unwrap();

        let stored = db.list_recipes_for_output("torch").unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].inputs.len(), 2);
        assert_eq!(stored[0].station.as_deref(), Some("plain"));
    }

    #[test]
    fn test_extraction_records_roundtrip_outputs() {
        let db = Database::open_in_memory().unwrap();
        let source = db.get_or_create_source(&Source::new("mod")).unwrap();

        let record = ExtractionRecord {
            input: ItemCount::new("sand", 1),
            co_inputs: vec![],
            method: "centrifuge_rocks".to_string(),
            outputs: vec![ExtractionOutput {
                item: "silicon".to_string(),
                count: 1,
                probability: Some(0.9),
                tier: Some("common".to_string()),
            }],
        };

        let outcome = db.store_extraction_records(&source, &[record]).unwrap();
        assert_eq!(outcome.written, 1);

        let stored = db.list_extraction_records("sand").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].outputs[0].probability, Some(0.9));
        assert_eq!(db.search("silicon", None).unwrap().len(), 1);
    }
}
