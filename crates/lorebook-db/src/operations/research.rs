//! Research tree operations.

use crate::database::{BatchOutcome, Database};
use crate::error::{DbError, DbResult};
use crate::operations::search::{replace_search_entry, summarize};
use lorebook_core::{new_id, EntityKind, ResearchNode, SearchEntry, Source};
use rusqlite::params;
use tracing::debug;

impl Database {
    /// Store research nodes in one transaction, replacing by (tree, node).
    ///
    /// A replaced node keeps its row id, and its search row is rewritten
    /// rather than appended.
    pub fn store_research_nodes(
        &self,
        source: &Source,
        nodes: &[ResearchNode],
    ) -> DbResult<BatchOutcome> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut outcome = BatchOutcome::default();

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO research_nodes
                    (id, source_id, tree_id, node_id, name, description, cost,
                     prerequisites, unlocks)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT (tree_id, node_id) DO UPDATE SET
                    source_id = excluded.source_id,
                    name = excluded.name,
                    description = excluded.description,
                    cost = excluded.cost,
                    prerequisites = excluded.prerequisites,
                    unlocks = excluded.unlocks
                RETURNING id
                "#,
            )?;

            for node in nodes {
                let node_row_id: String = stmt.query_row(
                    params![
                        new_id(),
                        source.id,
                        node.tree_id,
                        node.node_id,
                        node.name,
                        node.description,
                        serde_json::to_string(&node.cost)?,
                        serde_json::to_string(&node.prerequisites)?,
                        serde_json::to_string(&node.unlocks)?,
                    ],
                    |row| row.get(0),
                )?;
                outcome.record(1);

                replace_search_entry(
                    &tx,
                    &SearchEntry {
                        kind: EntityKind::ResearchNode,
                        entity_id: node_row_id,
                        name: node.qualified_id(),
                        source: source.name.clone(),
                        body: summarize(&format!(
                            "{} {}",
                            node.name,
                            node.description.as_deref().unwrap_or("")
                        )),
                    },
                )?;
            }
        }

        tx.commit()?;
        debug!("Stored {} research nodes", outcome.written);
        Ok(outcome)
    }

    /// Get a research node by tree and node id.
    pub fn get_research_node(
        &self,
        tree_id: &str,
        node_id: &str,
    ) -> DbResult<Option<ResearchNode>> {
        let conn = self.conn()?;
        let result = conn.query_row(
            r#"
            SELECT tree_id, node_id, name, description, cost, prerequisites, unlocks
            FROM research_nodes WHERE tree_id = ?1 AND node_id = ?2
            "#,
            params![tree_id, node_id],
            |row| {
                let cost: String = row.get(4)?;
                let prerequisites: String = row.get(5)?;
                let unlocks: String = row.get(6)?;

                Ok(ResearchNode {
                    tree_id: row.get(0)?,
                    node_id: row.get(1)?,
                    name: row.get(2)?,
                    description: row.get(3)?,
                    cost: serde_json::from_str(&cost).unwrap_or_default(),
                    prerequisites: serde_json::from_str(&prerequisites).unwrap_or_default(),
                    unlocks: serde_json::from_str(&unlocks).unwrap_or_default(),
                })
            },
        );

        match result {
            Ok(node) => Ok(Some(node)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DbError::from(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorebook_core::ItemCount;

    #[test]
    fn test_store_and_replace_node() {
        let db = Database::open_in_memory().unwrap();
        let source = db.get_or_create_source(&Source::new("mod")).unwrap();

        let mut node = ResearchNode::new("fu_agriculture", "seeds1");
        node.cost.push(ItemCount::new("fuscienceresource", 10));
        node.prerequisites.push("fu_agriculture:start".to_string());
        db.store_research_nodes(&source, &[node.clone()]).unwrap();

        node.name = "Seed Science".to_string();
        db.store_research_nodes(&source, &[node]).unwrap();

        let stored = db
            .get_research_node("fu_agriculture", "seeds1")
            .unwrap()
            .unwrap();
        assert_eq!(stored.name, "Seed Science");
        assert_eq!(stored.cost[0].count, 10);
        assert_eq!(stored.prerequisites, vec!["fu_agriculture:start".to_string()]);
        assert_eq!(db.get_stats().unwrap().research_nodes, 1);
    }

    #[test]
    fn test_rerun_keeps_one_live_search_row() {
        let db = Database::open_in_memory().unwrap();
        let source = db.get_or_create_source(&Source::new("mod")).unwrap();
        let nodes = vec![ResearchNode::new("t1", "a"), ResearchNode::new("t1", "b")];

        db.store_research_nodes(&source, &nodes).unwrap();
        db.store_research_nodes(&source, &nodes).unwrap();

        let hits = db.search("t1", None).unwrap();
        assert_eq!(hits.len(), 2);

        let conn = db.conn().unwrap();
        for hit in hits {
            let live: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM research_nodes WHERE id = ?1",
                    params![hit.entity_id],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(live, 1);
        }
    }

    #[test]
    fn test_missing_node() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_research_node("tree", "nope").unwrap().is_none());
    }
}
