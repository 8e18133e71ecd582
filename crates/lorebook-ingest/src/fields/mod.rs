//! Heuristic field-type recovery from engine source text.
//!
//! The engine reads asset files through a handful of accessor idioms
//! (`getString("f")`, `opt("f")`, `jsonToVec2F(x.get("f"))`, ...). Scanning
//! for those idioms recovers an approximate schema per asset type. This is
//! schema recovery, not verification: every family is best-effort and a file
//! with no matches simply yields no fields.

mod lookup;
mod patterns;

pub use lookup::{asset_type_for, AssetTypeInfo};
pub use patterns::{converter_type, PatternFamily, FAMILIES};

use lorebook_core::{AssetField, FieldType};
use std::collections::HashSet;

/// A field recovered by one pattern family.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub default_value: Option<String>,
    /// Byte offset of the match in the scanned text.
    pub offset: usize,
}

/// Shared state of one file scan, threaded through the families in order.
pub struct ScanContext<'a> {
    text: &'a str,
    window: usize,
    fields: Vec<AssetField>,
    seen: HashSet<(String, FieldType)>,
    names: HashSet<String>,
    typed_names: HashSet<String>,
}

impl<'a> ScanContext<'a> {
    pub fn new(text: &'a str, window: usize) -> Self {
        Self {
            text,
            window,
            fields: Vec::new(),
            seen: HashSet::new(),
            names: HashSet::new(),
            typed_names: HashSet::new(),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Radius in bytes of the converter-name window.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Whether any family has recovered this name.
    pub fn has_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Whether a typed accessor has recovered this name.
    pub fn has_typed_name(&self, name: &str) -> bool {
        self.typed_names.contains(name)
    }

    pub fn mark_typed(&mut self, name: &str) {
        self.typed_names.insert(name.to_string());
    }

    /// Keep a candidate unless `(name, type)` was already recorded.
    pub fn record(&mut self, candidate: Candidate) {
        let key = (candidate.name.clone(), candidate.field_type);
        if !self.seen.insert(key) {
            return;
        }

        self.names.insert(candidate.name.clone());
        self.fields.push(AssetField {
            path: candidate.name,
            field_type: candidate.field_type,
            required: candidate.required,
            default_value: candidate.default_value,
            enum_values: Vec::new(),
            examples: vec![snippet_at(self.text, candidate.offset)],
        });
    }

    pub fn into_fields(self) -> Vec<AssetField> {
        self.fields
    }
}

/// The line containing `offset` plus the line after it.
fn snippet_at(text: &str, offset: usize) -> String {
    let start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    text[start..]
        .lines()
        .take(2)
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Runs every pattern family, in priority order, over one file.
#[derive(Debug, Clone, Copy)]
pub struct FieldExtractor {
    window: usize,
}

impl FieldExtractor {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn extract(&self, text: &str) -> Vec<AssetField> {
        let mut ctx = ScanContext::new(text, self.window);
        for family in FAMILIES {
            family.scan(&mut ctx);
        }
        ctx.into_fields()
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(80)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Join statements with filler lines wider than the converter window.
    fn source(statements: &[&str]) -> String {
        let filler = format!("// {}", "-".repeat(100));
        statements.join(&format!("\n{}\n", filler))
    }

    fn find<'a>(fields: &'a [AssetField], name: &str) -> Vec<&'a AssetField> {
        fields.iter().filter(|f| f.path == name).collect()
    }

    #[test]
    fn test_all_families() {
        let text = source(&[
            r#"m_name = config.getString("objectName");"#,
            r#"m_health = config.getFloat("health", 100.0f);"#,
            r#"auto size = jsonToVec2F(config.get("size"));"#,
            r#"auto pos = config.opt("offset").apply(jsonToVec2I);"#,
            r#"m_category = config.optString("category");"#,
            r#"m_count = config.get("count", 3).toInt();"#,
            r#"m_smashable = config->get("smashable", false);"#,
            r#"if (config.contains("animation")) {}"#,
            r#"if (config.contains("objectName")) {}"#,
        ]);

        let fields = FieldExtractor::default().extract(&text);
        assert_eq!(fields.len(), 8);

        let name = find(&fields, "objectName")[0];
        assert_eq!(name.field_type, FieldType::String);
        assert!(name.required);

        let health = find(&fields, "health")[0];
        assert_eq!(health.field_type, FieldType::Float);
        assert!(!health.required);
        assert_eq!(health.default_value.as_deref(), Some("100.0f"));

        let size = find(&fields, "size");
        assert_eq!(size.len(), 1);
        assert_eq!(size[0].field_type, FieldType::Vec2);
        assert!(size[0].required);

        assert_eq!(find(&fields, "offset")[0].field_type, FieldType::Vec2);
        assert_eq!(find(&fields, "category")[0].field_type, FieldType::String);
        assert_eq!(find(&fields, "count")[0].field_type, FieldType::Int);
        assert_eq!(find(&fields, "smashable")[0].field_type, FieldType::Bool);

        let animation = find(&fields, "animation")[0];
        assert_eq!(animation.field_type, FieldType::Untyped);
        assert!(!animation.required);
    }

    #[test]
    fn test_same_name_two_types_survive() {
        let text = source(&[
            r#"auto x = config.opt("mode");"#,
            r#"auto y = config.get("mode").toInt();"#,
            r#"auto z = config.get("mode").toInt();"#,
        ]);

        let fields = FieldExtractor::default().extract(&text);
        let types: Vec<FieldType> = find(&fields, "mode").iter().map(|f| f.field_type).collect();
        assert_eq!(types, vec![FieldType::Json, FieldType::Int]);
    }

    #[test]
    fn test_typed_name_blocks_generic_accessor() {
        let text = source(&[
            r#"m_kind = config.getString("kind", "plain");"#,
            r#"m_other = config.get("kind").toBool();"#,
        ]);

        let fields = FieldExtractor::default().extract(&text);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].default_value.as_deref(), Some("\"plain\""));
    }

    #[test]
    fn test_snippet_is_line_and_next() {
        let text = "a();\n  x = c.getInt(\"level\");\n  y();\nz();";
        let fields = FieldExtractor::default().extract(text);
        assert_eq!(fields[0].examples, vec!["x = c.getInt(\"level\");\ny();".to_string()]);
    }

    #[test]
    fn test_no_matches() {
        assert!(FieldExtractor::default().extract("int main() { return 0; }").is_empty());
    }
}
