//! Plain crafting recipes (`*.recipe` files).

use super::{item_count, string_list};
use lorebook_core::Recipe;
use serde_json::Value;

/// Parse one recipe file.
///
/// Returns `None` when the output item or a non-empty input list is missing.
/// The first crafting group becomes the station label.
pub fn parse_recipe(value: &Value, notes: Option<&str>) -> Option<Recipe> {
    let output = item_count(value.get("output")?)?;
    let inputs: Vec<_> = value
        .get("input")?
        .as_array()?
        .iter()
        .filter_map(item_count)
        .collect();
    if inputs.is_empty() {
        return None;
    }

    let groups = string_list(value.get("groups"));

    Some(Recipe {
        output,
        station: groups.first().cloned(),
        groups,
        inputs,
        duration: value.get("duration").and_then(Value::as_f64),
        notes: notes.map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorebook_core::ItemCount;
    use serde_json::json;

    #[test]
    fn test_full_recipe() {
        let value = json!({
            "input": [{"item": "coalore", "count": 1}, {"item": "logblock"}],
            "output": {"item": "torch", "count": 3},
            "groups": ["plain", "craftingtable", "all"],
            "duration": 0.5
        });

        let recipe = parse_recipe(&value, Some("items/torch.recipe")).unwrap();
        assert_eq!(recipe.output, ItemCount::new("torch", 3));
        assert_eq!(recipe.inputs[1], ItemCount::new("logblock", 1));
        assert_eq!(recipe.station.as_deref(), Some("plain"));
        assert_eq!(recipe.groups.len(), 3);
        assert_eq!(recipe.duration, Some(0.5));
        assert_eq!(recipe.notes.as_deref(), Some("items/torch.recipe"));
    }

    #[test]
    fn test_defaults() {
        let value = json!({
            "input": [{"name": "fibre"}],
            "output": {"name": "rope"}
        });

        let recipe = parse_recipe(&value, None).unwrap();
        assert_eq!(recipe.output.count, 1);
        assert!(recipe.station.is_none());
        assert!(recipe.duration.is_none());
    }

    #[test]
    fn test_unusable_recipes() {
        let no_output_item = json!({"input": [{"item": "a"}], "output": {"count": 2}});
        assert!(parse_recipe(&no_output_item, None).is_none());
        assert!(parse_recipe(&json!({"input": [], "output": {"item": "a"}}), None).is_none());
        assert!(parse_recipe(&json!({"output": {"item": "a"}}), None).is_none());
        assert!(parse_recipe(&json!([1, 2]), None).is_none());
    }
}
