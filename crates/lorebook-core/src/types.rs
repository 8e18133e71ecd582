//! Core domain types for Lorebook.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for sources.
pub type SourceId = String;

/// Unique identifier for stored records of any family.
pub type RecordId = String;

/// Generate a new unique ID.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A named origin of extracted data (base game, a mod, a doc set).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: SourceId,
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Source {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            version: None,
            description: None,
            url: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// A single parameter of a documented function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiParam {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    pub optional: bool,
}

impl ApiParam {
    pub fn new(name: impl Into<String>, param_type: impl Into<String>, optional: bool) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            optional,
        }
    }
}

/// Where a signature was found in the documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub file: String,
    /// 1-based line of the signature heading.
    pub line: usize,
}

/// A documented function, possibly merged from several overloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiFunction {
    pub table: String,
    pub name: String,
    pub signature: String,
    pub description: String,
    pub return_type: String,
    pub params: Vec<ApiParam>,
    pub examples: Vec<String>,
    pub notes: Option<String>,
    pub provenance: Vec<Provenance>,
}

impl ApiFunction {
    /// Qualified `table.function` name.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table, self.name)
    }
}

/// A named function grouping and the functions documented for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiTable {
    pub name: String,
    /// Which script contexts may call functions of this table.
    pub context: String,
    pub functions: Vec<ApiFunction>,
}

impl ApiTable {
    pub fn new(name: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context: context.into(),
            functions: Vec::new(),
        }
    }
}

/// Semantic type inferred for an asset field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Bool,
    Float,
    Int,
    Array,
    Object,
    Vec2,
    Color,
    Rect,
    Polygon,
    List,
    WeightedPool,
    /// Opaque structured value.
    Json,
    /// Known to be present, type unknown.
    Untyped,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Bool => "bool",
            FieldType::Float => "float",
            FieldType::Int => "int",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Vec2 => "vec2",
            FieldType::Color => "color",
            FieldType::Rect => "rect",
            FieldType::Polygon => "polygon",
            FieldType::List => "list",
            FieldType::WeightedPool => "weightedpool",
            FieldType::Json => "json",
            FieldType::Untyped => "untyped",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "string" => Some(FieldType::String),
            "bool" => Some(FieldType::Bool),
            "float" => Some(FieldType::Float),
            "int" => Some(FieldType::Int),
            "array" => Some(FieldType::Array),
            "object" => Some(FieldType::Object),
            "vec2" => Some(FieldType::Vec2),
            "color" => Some(FieldType::Color),
            "rect" => Some(FieldType::Rect),
            "polygon" => Some(FieldType::Polygon),
            "list" => Some(FieldType::List),
            "weightedpool" => Some(FieldType::WeightedPool),
            "json" => Some(FieldType::Json),
            "untyped" => Some(FieldType::Untyped),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A field recovered from source text for an asset type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetField {
    /// Dot-notation path of the field.
    pub path: String,
    pub field_type: FieldType,
    pub required: bool,
    /// Default expression, stored unparsed.
    pub default_value: Option<String>,
    pub enum_values: Vec<String>,
    /// Advisory context snippets for manual review.
    pub examples: Vec<String>,
}

/// A schema category of configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetType {
    pub name: String,
    pub extension: String,
    pub description: String,
    pub base_path: String,
    pub fields: Vec<AssetField>,
}

/// An item reference with a count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCount {
    pub item: String,
    pub count: u32,
}

impl ItemCount {
    pub fn new(item: impl Into<String>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
        }
    }
}

/// A crafting recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub output: ItemCount,
    /// First crafting group, used as the station label.
    pub station: Option<String>,
    pub groups: Vec<String>,
    pub inputs: Vec<ItemCount>,
    pub duration: Option<f64>,
    pub notes: Option<String>,
}

/// One output of an extraction record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutput {
    pub item: String,
    pub count: u32,
    pub probability: Option<f64>,
    pub tier: Option<String>,
}

/// A generalized "transform one item into others" record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub input: ItemCount,
    /// Additional inputs consumed together with the primary one.
    pub co_inputs: Vec<ItemCount>,
    pub method: String,
    pub outputs: Vec<ExtractionOutput>,
}

/// One unlockable entry in a research tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchNode {
    pub tree_id: String,
    pub node_id: String,
    pub name: String,
    pub description: Option<String>,
    pub cost: Vec<ItemCount>,
    /// Qualified ids (`tree:node`) of nodes listing this one as a child.
    pub prerequisites: Vec<String>,
    pub unlocks: Vec<String>,
}

impl ResearchNode {
    pub fn new(tree_id: impl Into<String>, node_id: impl Into<String>) -> Self {
        let node_id = node_id.into();
        Self {
            tree_id: tree_id.into(),
            name: node_id.clone(),
            node_id,
            description: None,
            cost: Vec::new(),
            prerequisites: Vec::new(),
            unlocks: Vec::new(),
        }
    }

    /// Global identity of the node.
    pub fn qualified_id(&self) -> String {
        qualified_node_id(&self.tree_id, &self.node_id)
    }
}

/// Build the `tree:node` identity used for prerequisites.
pub fn qualified_node_id(tree_id: &str, node_id: &str) -> String {
    format!("{}:{}", tree_id, node_id)
}

/// Kind of entity a search row points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    ApiFunction,
    AssetField,
    Recipe,
    Extraction,
    ResearchNode,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::ApiFunction => "api_function",
            EntityKind::AssetField => "asset_field",
            EntityKind::Recipe => "recipe",
            EntityKind::Extraction => "extraction",
            EntityKind::ResearchNode => "research_node",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "api_function" => Some(EntityKind::ApiFunction),
            "asset_field" => Some(EntityKind::AssetField),
            "recipe" => Some(EntityKind::Recipe),
            "extraction" => Some(EntityKind::Extraction),
            "research_node" => Some(EntityKind::ResearchNode),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A row of the full-text search index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEntry {
    pub kind: EntityKind,
    pub entity_id: RecordId,
    pub name: String,
    pub source: String,
    pub body: String,
}

/// Statistics about the knowledge store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreStats {
    pub sources: i64,
    pub api_tables: i64,
    pub api_functions: i64,
    pub asset_types: i64,
    pub asset_fields: i64,
    pub recipes: i64,
    pub extraction_records: i64,
    pub research_nodes: i64,
    pub search_entries: i64,
    pub database_size_bytes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_roundtrip_names() {
        assert_eq!(FieldType::from_str("vec2"), Some(FieldType::Vec2));
        assert_eq!(FieldType::from_str("WeightedPool"), Some(FieldType::WeightedPool));
        assert_eq!(FieldType::Untyped.as_str(), "untyped");
        assert_eq!(FieldType::from_str("xyz"), None);
    }

    #[test]
    fn test_source_creation() {
        let source = Source::new("base")
            .with_version("1.4.4")
            .with_url("https://example.com");

        assert_eq!(source.name, "base");
        assert_eq!(source.version, Some("1.4.4".to_string()));
        assert!(!source.id.is_empty());
    }

    #[test]
    fn test_research_node_defaults_name_to_id() {
        let node = ResearchNode::new("t1", "a");
        assert_eq!(node.name, "a");
        assert_eq!(node.qualified_id(), "t1:a");
    }

    #[test]
    fn test_param_serializes_type_key() {
        let param = ApiParam::new("position", "Vec2F", false);
        let json = serde_json::to_value(&param).unwrap();
        assert_eq!(json["type"], "Vec2F");
    }
}
