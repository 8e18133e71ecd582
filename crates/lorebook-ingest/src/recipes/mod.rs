//! Recipe, transformation table and research tree extraction.
//!
//! Every extractor here works on already-parsed JSON values and never fails:
//! unusable entries are dropped and the caller decides what to count.

pub mod centrifuge;
pub mod lab;
pub mod plain;
pub mod research;

use lorebook_core::ItemCount;
use serde_json::Value;

/// A non-negative count from a JSON number.
pub(crate) fn count_of(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    value
        .as_f64()
        .filter(|n| n.is_finite() && *n >= 0.0 && *n <= f64::from(u32::MAX))
        .map(|n| n.round() as u32)
}

/// An item reference in any of the shapes configs use.
///
/// Accepts `"item"`, `["item", count]` and `{"item"|"name": .., "count": ..}`;
/// the count defaults to 1.
pub(crate) fn item_count(value: &Value) -> Option<ItemCount> {
    match value {
        Value::String(item) if !item.is_empty() => Some(ItemCount::new(item.as_str(), 1)),
        Value::Array(parts) => {
            let item = parts.first()?.as_str().filter(|s| !s.is_empty())?;
            let count = parts.get(1).map_or(Some(1), count_of)?;
            Some(ItemCount::new(item, count))
        }
        Value::Object(map) => {
            let item = map
                .get("item")
                .or_else(|| map.get("name"))?
                .as_str()
                .filter(|s| !s.is_empty())?;
            let count = map.get("count").map_or(Some(1), count_of)?;
            Some(ItemCount::new(item, count))
        }
        _ => None,
    }
}

/// Strings of a JSON array, ignoring other elements.
pub(crate) fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    other => item_count(other).map(|ic| ic.item),
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_count_shapes() {
        assert_eq!(item_count(&json!("torch")), Some(ItemCount::new("torch", 1)));
        assert_eq!(item_count(&json!(["ore", 3])), Some(ItemCount::new("ore", 3)));
        assert_eq!(
            item_count(&json!({"name": "bar", "count": 2.0})),
            Some(ItemCount::new("bar", 2))
        );
        assert_eq!(item_count(&json!({"item": "log"})), Some(ItemCount::new("log", 1)));

        assert!(item_count(&json!({"count": 2})).is_none());
        assert!(item_count(&json!({"item": "x", "count": -1})).is_none());
        assert!(item_count(&json!("")).is_none());
        assert!(item_count(&json!(5)).is_none());
    }

    #[test]
    fn test_string_list() {
        let value = json!(["a", {"item": "b"}, 3]);
        assert_eq!(string_list(Some(&value)), vec!["a".to_string(), "b".to_string()]);
        assert!(string_list(None).is_empty());
    }
}
