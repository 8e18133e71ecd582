//! Research tree reconstruction.
//!
//! Research files author only parent -> child edges. Prerequisites are
//! derived in two passes: [`collect_nodes`] establishes every node identity
//! across all files, then [`derive_prerequisites`] re-scans the files and
//! inverts the `children` lists. A node may gain several parents, so the
//! result is a DAG rather than a tree.

use super::{item_count, string_list};
use lorebook_core::{qualified_node_id, ResearchNode};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// A parsed config file that carries the research marker key.
#[derive(Debug, Clone)]
pub struct ResearchFile {
    /// Path relative to the ingested root.
    pub file: String,
    pub value: Value,
}

/// Whether a parsed config contributes research trees.
pub fn is_research_file(value: &Value, marker: &str) -> bool {
    value.get(marker).map_or(false, Value::is_object)
}

/// Nodes keyed by qualified id, in first-definition order.
#[derive(Debug, Default)]
pub struct NodeSet {
    nodes: Vec<ResearchNode>,
    index: HashMap<String, usize>,
    /// Definitions ignored because the node was already defined.
    pub duplicates: usize,
}

impl NodeSet {
    pub fn get(&self, qualified_id: &str) -> Option<&ResearchNode> {
        self.index.get(qualified_id).map(|&i| &self.nodes[i])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn into_nodes(self) -> Vec<ResearchNode> {
        self.nodes
    }

    fn insert(&mut self, node: ResearchNode) -> bool {
        let id = node.qualified_id();
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id, self.nodes.len());
        self.nodes.push(node);
        true
    }
}

fn trees<'a>(
    value: &'a Value,
    marker: &str,
) -> impl Iterator<Item = (&'a String, &'a Map<String, Value>)> {
    value
        .get(marker)
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|trees| trees.iter())
        .filter_map(|(tree_id, nodes)| nodes.as_object().map(|n| (tree_id, n)))
}

/// The node string table: either the map under `strings_key` itself or its
/// nested `research` map.
fn string_table<'a>(value: &'a Value, strings_key: &str) -> Option<&'a Map<String, Value>> {
    let strings = value.get(strings_key)?.as_object()?;
    match strings.get("research").and_then(Value::as_object) {
        Some(nested) => Some(nested),
        None => Some(strings),
    }
}

/// Display name and description from a `[name, desc]` or `{name, description}` entry.
fn display_strings(entry: &Value) -> (Option<String>, Option<String>) {
    let text = |v: Option<&Value>| v.and_then(Value::as_str).map(str::to_string);
    match entry {
        Value::Array(parts) => (text(parts.first()), text(parts.get(1))),
        Value::Object(map) => (text(map.get("name")), text(map.get("description"))),
        Value::String(name) => (Some(name.clone()), None),
        _ => (None, None),
    }
}

fn build_node(
    tree_id: &str,
    node_id: &str,
    body: &Value,
    strings: Option<&Map<String, Value>>,
) -> ResearchNode {
    let mut node = ResearchNode::new(tree_id, node_id);

    node.cost = body
        .get("price")
        .and_then(Value::as_array)
        .map(|price| price.iter().filter_map(item_count).collect())
        .unwrap_or_default();
    node.unlocks = string_list(body.get("unlocks"));

    if let Some(entry) = strings.and_then(|s| s.get(node_id)) {
        let (name, description) = display_strings(entry);
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            node.name = name;
        }
        node.description = description;
    }

    node
}

/// Pass 1: every node identity across all files. The first definition wins.
pub fn collect_nodes(files: &[ResearchFile], marker: &str, strings_key: &str) -> NodeSet {
    let mut set = NodeSet::default();

    for file in files {
        let strings = string_table(&file.value, strings_key);
        for (tree_id, nodes) in trees(&file.value, marker) {
            for (node_id, body) in nodes {
                let node = build_node(tree_id, node_id, body, strings);
                if !set.insert(node) {
                    set.duplicates += 1;
                    debug!(
                        "Duplicate research node {} in {}",
                        qualified_node_id(tree_id, node_id),
                        file.file
                    );
                }
            }
        }
    }

    set
}

/// Pass 2: invert `children` into prerequisites.
///
/// Returns the number of dangling child references (children naming no
/// known node in the same tree).
pub fn derive_prerequisites(files: &[ResearchFile], marker: &str, set: &mut NodeSet) -> usize {
    let mut dangling = 0;

    for file in files {
        for (tree_id, nodes) in trees(&file.value, marker) {
            for (parent_id, body) in nodes {
                let parent = qualified_node_id(tree_id, parent_id);
                for child_id in string_list(body.get("children")) {
                    let child = qualified_node_id(tree_id, &child_id);
                    let Some(&slot) = set.index.get(&child) else {
                        debug!("Dangling research child {} of {} in {}", child, parent, file.file);
                        dangling += 1;
                        continue;
                    };

                    let prerequisites = &mut set.nodes[slot].prerequisites;
                    if !prerequisites.contains(&parent) {
                        prerequisites.push(parent.clone());
                    }
                }
            }
        }
    }

    dangling
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn file(name: &str, value: Value) -> ResearchFile {
        ResearchFile {
            file: name.to_string(),
            value,
        }
    }

    #[test]
    fn test_child_gains_parent_prerequisite() {
        let files = vec![file(
            "t1.config",
            json!({
                "researchTree": {
                    "t1": {
                        "a": {"price": [["science", 5]], "children": ["b"], "unlocks": ["torch"]},
                        "b": {"price": [{"item": "science", "count": 10}]}
                    }
                },
                "strings": {"a": ["Alpha", "The first node"]}
            }),
        )];

        let mut set = collect_nodes(&files, "researchTree", "strings");
        let dangling = derive_prerequisites(&files, "researchTree", &mut set);

        assert_eq!(dangling, 0);
        let b = set.get("t1:b").unwrap();
        assert_eq!(b.prerequisites, vec!["t1:a".to_string()]);
        assert_eq!(b.name, "b");
        assert_eq!(b.cost[0].count, 10);

        let a = set.get("t1:a").unwrap();
        assert!(a.prerequisites.is_empty());
        assert_eq!(a.name, "Alpha");
        assert_eq!(a.description.as_deref(), Some("The first node"));
        assert_eq!(a.unlocks, vec!["torch".to_string()]);
    }

    #[test]
    fn test_multiple_parents_across_files() {
        let files = vec![
            file(
                "one.config",
                json!({"researchTree": {"t": {"a": {"children": ["c"]}, "c": {}}}}),
            ),
            file(
                "two.config",
                json!({
                    "researchTree": {"t": {
                        "b": {"children": ["c", "ghost"]},
                        "c": {"price": [["x", 1]]}
                    }},
                    "strings": {"research": {"b": {"name": "Beta", "description": "Second"}}}
                }),
            ),
        ];

        let mut set = collect_nodes(&files, "researchTree", "strings");
        assert_eq!(set.len(), 3);
        assert_eq!(set.duplicates, 1);

        let dangling = derive_prerequisites(&files, "researchTree", &mut set);
        assert_eq!(dangling, 1);

        let c = set.get("t:c").unwrap();
        assert_eq!(c.prerequisites, vec!["t:a".to_string(), "t:b".to_string()]);
        // first definition wins
        assert!(c.cost.is_empty());

        assert_eq!(set.get("t:b").unwrap().name, "Beta");
    }

    #[test]
    fn test_same_node_id_in_two_trees() {
        let files = vec![file(
            "x.config",
            json!({"researchTree": {"t1": {"a": {}}, "t2": {"a": {}}}}),
        )];
        let set = collect_nodes(&files, "researchTree", "strings");
        assert_eq!(set.len(), 2);
        assert_eq!(set.duplicates, 0);
    }

    #[test]
    fn test_marker_detection() {
        assert!(is_research_file(&json!({"researchTree": {}}), "researchTree"));
        assert!(!is_research_file(&json!({"researchTree": []}), "researchTree"));
        assert!(!is_research_file(&json!({"recipes": []}), "researchTree"));
    }
}
