//! Tiered centrifuge tables.
//!
//! Each known top-level key maps input item -> {output item -> [rarity, count]}.

use super::count_of;
use lorebook_config::RarityTable;
use lorebook_core::{ExtractionOutput, ExtractionRecord, ItemCount};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

fn parse_output(item: &str, value: &Value, rarity: &RarityTable) -> Option<ExtractionOutput> {
    let parts = value.as_array()?;
    let tier = parts.first()?.as_str()?;
    let probability = rarity.probability(tier)?;
    let count = parts.get(1).map_or(Some(1), count_of)?;

    Some(ExtractionOutput {
        item: item.to_string(),
        count,
        probability: Some(probability),
        tier: Some(tier.to_string()),
    })
}

/// Parse a centrifuge config into extraction records.
///
/// `methods` maps the known table keys to method labels; other keys are
/// ignored. Outputs with an unknown rarity are dropped, and so are inputs
/// left without outputs.
pub fn parse_centrifuge(
    value: &Value,
    methods: &BTreeMap<String, String>,
    rarity: &RarityTable,
) -> Vec<ExtractionRecord> {
    let Some(tables) = value.as_object() else {
        return Vec::new();
    };

    let mut records = Vec::new();
    for (key, table) in tables {
        let Some(method) = methods.get(key) else {
            debug!("Ignoring centrifuge key {}", key);
            continue;
        };
        let Some(inputs) = table.as_object() else {
            continue;
        };

        for (input, outputs) in inputs {
            let outputs: Vec<ExtractionOutput> = outputs
                .as_object()
                .map(|map| {
                    map.iter()
                        .filter_map(|(item, v)| parse_output(item, v, rarity))
                        .collect()
                })
                .unwrap_or_default();

            if outputs.is_empty() {
                continue;
            }

            records.push(ExtractionRecord {
                input: ItemCount::new(input.as_str(), 1),
                co_inputs: Vec::new(),
                method: method.clone(),
                outputs,
            });
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorebook_config::RecipesConfig;
    use serde_json::json;

    #[test]
    fn test_parse_centrifuge() {
        let value = json!({
            "itemMapRocks": {
                "sand": {"silicon": ["common", 1], "gold": ["rarest", 2], "junk": ["legendary", 1]},
                "nothing": {"junk": ["legendary", 1]}
            },
            "itemMapBees": {
                "honey": {"wax": ["uncommon", 1]}
            },
            "someOtherTable": {
                "x": {"y": ["common", 1]}
            }
        });

        let methods = RecipesConfig::default().centrifuge_methods;
        let mut records = parse_centrifuge(&value, &methods, &RarityTable::default());
        records.sort_by(|a, b| a.input.item.cmp(&b.input.item));

        assert_eq!(records.len(), 2);

        let honey = &records[0];
        assert_eq!(honey.method, "centrifuge_bees");
        assert_eq!(honey.outputs[0].probability, Some(0.5));

        let sand = &records[1];
        assert_eq!(sand.method, "centrifuge_rocks");
        assert_eq!(sand.outputs.len(), 2);
        let gold = sand.outputs.iter().find(|o| o.item == "gold").unwrap();
        assert_eq!(gold.count, 2);
        assert_eq!(gold.probability, Some(0.05));
        assert_eq!(gold.tier.as_deref(), Some("rarest"));
    }

    #[test]
    fn test_non_object_input() {
        let methods = RecipesConfig::default().centrifuge_methods;
        assert!(parse_centrifuge(&json!([1, 2]), &methods, &RarityTable::default()).is_empty());
    }
}
