//! Tiered lab recipes.
//!
//! A lab file is a bare list of recipes or an object holding the list under
//! a known key. Each output value is a bare count, a one-element list (both
//! tier "all") or a three-element list with one count per lab tier.

use super::count_of;
use lorebook_core::{ExtractionOutput, ExtractionRecord, ItemCount};
use serde_json::Value;

/// Tier recorded for outputs that do not vary by lab tier.
pub const ALL_TIERS: &str = "all";

/// Lab tiers, in the order three-element output lists use.
pub const LAB_TIERS: [&str; 3] = ["basic", "advanced", "quantum"];

/// The recipe list of a lab file, or `None` for any other shape.
pub fn recipe_list<'a>(value: &'a Value, list_key: &str) -> Option<&'a Vec<Value>> {
    match value {
        Value::Array(list) => Some(list),
        Value::Object(map) => map.get(list_key)?.as_array(),
        _ => None,
    }
}

fn output(item: &str, count: u32, tier: &str) -> ExtractionOutput {
    ExtractionOutput {
        item: item.to_string(),
        count,
        probability: Some(1.0),
        tier: Some(tier.to_string()),
    }
}

fn parse_outputs(item: &str, value: &Value) -> Vec<ExtractionOutput> {
    if let Some(count) = count_of(value) {
        return vec![output(item, count, ALL_TIERS)];
    }

    match value.as_array().map(Vec::as_slice) {
        Some([single]) => count_of(single)
            .map(|count| vec![output(item, count, ALL_TIERS)])
            .unwrap_or_default(),
        Some(tiers @ [_, _, _]) => tiers
            .iter()
            .zip(LAB_TIERS)
            .filter_map(|(v, tier)| count_of(v).map(|count| output(item, count, tier)))
            .collect(),
        _ => Vec::new(),
    }
}

/// Parse one lab recipe; recipes producing no rows yield `None`.
///
/// The first input is the primary one, the rest become co-inputs.
pub fn parse_lab_recipe(value: &Value, method: &str) -> Option<ExtractionRecord> {
    let mut inputs = value
        .get("inputs")?
        .as_object()?
        .iter()
        .filter_map(|(item, count)| count_of(count).map(|c| ItemCount::new(item.as_str(), c)));
    let input = inputs.next()?;
    let co_inputs: Vec<ItemCount> = inputs.collect();

    let outputs: Vec<ExtractionOutput> = value
        .get("outputs")?
        .as_object()?
        .iter()
        .flat_map(|(item, v)| parse_outputs(item, v))
        .collect();
    if outputs.is_empty() {
        return None;
    }

    Some(ExtractionRecord {
        input,
        co_inputs,
        method: method.to_string(),
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recipe_list_shapes() {
        let bare = json!([{"inputs": {}}]);
        assert_eq!(recipe_list(&bare, "recipes").map(Vec::len), Some(1));

        let keyed = json!({"recipes": [{}, {}]});
        assert_eq!(recipe_list(&keyed, "recipes").map(Vec::len), Some(2));

        assert!(recipe_list(&json!({"other": []}), "recipes").is_none());
        assert!(recipe_list(&json!("nope"), "recipes").is_none());
    }

    #[test]
    fn test_output_shapes() {
        let value = json!({
            "inputs": {"plantfibre": 5, "water": 1},
            "outputs": {"seed": 2, "bio": [3], "goo": [1, 2, 4], "bad": [1, 2]}
        });

        let record = parse_lab_recipe(&value, "extraction").unwrap();
        assert_eq!(record.input.item, "plantfibre");
        assert_eq!(record.co_inputs, vec![ItemCount::new("water", 1)]);
        assert_eq!(record.method, "extraction");
        assert_eq!(record.outputs.len(), 5);

        let goo: Vec<_> = record.outputs.iter().filter(|o| o.item == "goo").collect();
        assert_eq!(goo[2].tier.as_deref(), Some("quantum"));
        assert_eq!(goo[2].count, 4);
        assert!(record.outputs.iter().all(|o| o.probability == Some(1.0)));

        let seed = record.outputs.iter().find(|o| o.item == "seed").unwrap();
        assert_eq!(seed.tier.as_deref(), Some(ALL_TIERS));
    }

    #[test]
    fn test_zero_row_recipes_dropped() {
        let value = json!({"inputs": {"a": 1}, "outputs": {"b": "many"}});
        assert!(parse_lab_recipe(&value, "xenolab").is_none());

        let value = json!({"inputs": {}, "outputs": {"b": 1}});
        assert!(parse_lab_recipe(&value, "xenolab").is_none());
    }
}
