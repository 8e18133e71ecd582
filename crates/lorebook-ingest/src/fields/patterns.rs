//! Accessor pattern families, in priority order.

use super::{Candidate, ScanContext};
use lorebook_core::FieldType;
use regex::Regex;
use std::sync::LazyLock;

static TYPED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:\.|->)get(String|Bool|Float|Double|Int|UInt|Array|Object)\(\s*"([^"]+)"\s*(,)?"#,
    )
    .expect("valid regex")
});

static OPT_TYPED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:\.|->)opt(String|Bool|Float|Double|Int|UInt|Array|Object)\(\s*"([^"]+)""#)
        .expect("valid regex")
});

static OPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:\.|->)opt\(\s*"([^"]+)""#).expect("valid regex"));

static WRAPPED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(jsonTo[A-Za-z0-9]+)\(\s*[\w.:>()\-]*?(?:\.|->)get\(\s*"([^"]+)""#)
        .expect("valid regex")
});

static GET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:\.|->)get\(\s*"([^"]+)"\s*(,)?"#).expect("valid regex"));

static CONTAINS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:\.|->)contains\(\s*"([^"]+)""#).expect("valid regex"));

static COERCION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\.to(String|Bool|Float|Double|Int|UInt|Array|Object)\(").expect("valid regex")
});

static CONVERTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"jsonTo[A-Za-z0-9]+").expect("valid regex"));

static FLOAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?(?:\d+\.\d*|\.\d+)f?$").expect("valid regex"));

static INT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+u?$").expect("valid regex"));

/// One accessor idiom and how to type the fields it reads.
pub trait PatternFamily: Sync {
    fn name(&self) -> &'static str;

    /// Record every candidate this family finds in the context's text.
    fn scan(&self, ctx: &mut ScanContext<'_>);
}

/// All families, highest priority first.
pub static FAMILIES: &[&dyn PatternFamily] = &[
    &TypedAccessor,
    &OptionalTypedAccessor,
    &GenericOptionalAccessor,
    &ConverterWrappedAccessor,
    &GenericAccessor,
    &PresenceCheck,
];

/// Semantic type of a known value-conversion helper.
pub fn converter_type(helper: &str) -> Option<FieldType> {
    if !helper.starts_with("jsonTo") {
        return None;
    }
    if helper.ends_with("List") || helper.ends_with("Set") {
        Some(FieldType::List)
    } else if helper.starts_with("jsonToVec2") {
        Some(FieldType::Vec2)
    } else if helper.starts_with("jsonToColor") {
        Some(FieldType::Color)
    } else if helper.starts_with("jsonToRect") {
        Some(FieldType::Rect)
    } else if helper.starts_with("jsonToPoly") {
        Some(FieldType::Polygon)
    } else if helper.starts_with("jsonToWeightedPool") {
        Some(FieldType::WeightedPool)
    } else {
        None
    }
}

fn primitive_type(kind: &str) -> FieldType {
    match kind {
        "String" => FieldType::String,
        "Bool" => FieldType::Bool,
        "Float" | "Double" => FieldType::Float,
        "Int" | "UInt" => FieldType::Int,
        "Array" => FieldType::Array,
        _ => FieldType::Object,
    }
}

/// Type implied by the shape of a default literal.
fn literal_type(default: &str) -> Option<FieldType> {
    let literal = default.trim();
    match literal {
        "true" | "false" => return Some(FieldType::Bool),
        "JsonArray()" | "JsonArray{}" | "[]" => return Some(FieldType::Array),
        "JsonObject()" | "JsonObject{}" | "{}" => return Some(FieldType::Object),
        _ => {}
    }

    if FLOAT_RE.is_match(literal) {
        Some(FieldType::Float)
    } else if INT_RE.is_match(literal) {
        Some(FieldType::Int)
    } else if literal.len() >= 2 && literal.starts_with('"') && literal.ends_with('"') {
        Some(FieldType::String)
    } else {
        None
    }
}

fn floor_boundary(text: &str, mut index: usize) -> usize {
    index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// First known converter helper within `window` bytes around `start..end`.
fn converter_near(text: &str, start: usize, end: usize, window: usize) -> Option<FieldType> {
    let lo = floor_boundary(text, start.saturating_sub(window));
    let hi = floor_boundary(text, end.saturating_add(window));
    CONVERTER_RE
        .find_iter(&text[lo..hi])
        .find_map(|m| converter_type(m.as_str()))
}

/// Index of the `)` closing a call whose argument list starts at `from`.
fn call_close(text: &str, from: usize) -> Option<usize> {
    let mut depth = 1;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text[from..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    return (c == ')').then_some(from + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Default argument between `from` and the closing paren, if non-empty.
fn default_argument(text: &str, from: usize) -> Option<String> {
    let close = call_close(text, from)?;
    let default = text[from..close].trim();
    (!default.is_empty()).then(|| default.to_string())
}

/// `getString("f"[, default])` and friends.
pub struct TypedAccessor;

impl PatternFamily for TypedAccessor {
    fn name(&self) -> &'static str {
        "typed accessor"
    }

    fn scan(&self, ctx: &mut ScanContext<'_>) {
        let text = ctx.text();
        for caps in TYPED_RE.captures_iter(text) {
            let (Some(whole), Some(kind), Some(name)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let default_value = caps
                .get(3)
                .and_then(|_| default_argument(text, whole.end()));

            ctx.mark_typed(name.as_str());
            ctx.record(Candidate {
                name: name.as_str().to_string(),
                field_type: primitive_type(kind.as_str()),
                required: default_value.is_none(),
                default_value,
                offset: whole.start(),
            });
        }
    }
}

/// `optString("f")` and friends; always optional.
pub struct OptionalTypedAccessor;

impl PatternFamily for OptionalTypedAccessor {
    fn name(&self) -> &'static str {
        "optional typed accessor"
    }

    fn scan(&self, ctx: &mut ScanContext<'_>) {
        let text = ctx.text();
        for caps in OPT_TYPED_RE.captures_iter(text) {
            let (Some(whole), Some(kind), Some(name)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            ctx.record(Candidate {
                name: name.as_str().to_string(),
                field_type: primitive_type(kind.as_str()),
                required: false,
                default_value: None,
                offset: whole.start(),
            });
        }
    }
}

/// `opt("f")`, typed by a nearby converter helper.
pub struct GenericOptionalAccessor;

impl PatternFamily for GenericOptionalAccessor {
    fn name(&self) -> &'static str {
        "generic optional accessor"
    }

    fn scan(&self, ctx: &mut ScanContext<'_>) {
        let text = ctx.text();
        let window = ctx.window();
        for caps in OPT_RE.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let field_type =
                converter_near(text, whole.start(), whole.end(), window).unwrap_or(FieldType::Json);

            ctx.record(Candidate {
                name: name.as_str().to_string(),
                field_type,
                required: false,
                default_value: None,
                offset: whole.start(),
            });
        }
    }
}

/// `jsonToX(expr.get("f"))`; required, typed by the helper.
pub struct ConverterWrappedAccessor;

impl PatternFamily for ConverterWrappedAccessor {
    fn name(&self) -> &'static str {
        "converter-wrapped accessor"
    }

    fn scan(&self, ctx: &mut ScanContext<'_>) {
        let text = ctx.text();
        for caps in WRAPPED_RE.captures_iter(text) {
            let (Some(whole), Some(helper), Some(name)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let Some(field_type) = converter_type(helper.as_str()) else {
                continue;
            };

            ctx.record(Candidate {
                name: name.as_str().to_string(),
                field_type,
                required: true,
                default_value: None,
                offset: whole.start(),
            });
        }
    }
}

/// `get("f"[, default])` not already read by a typed accessor.
///
/// Typed by a nearby converter, then a trailing `.toX()` coercion, then the
/// shape of the default literal.
pub struct GenericAccessor;

impl PatternFamily for GenericAccessor {
    fn name(&self) -> &'static str {
        "generic accessor"
    }

    fn scan(&self, ctx: &mut ScanContext<'_>) {
        let text = ctx.text();
        let window = ctx.window();
        for caps in GET_RE.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if ctx.has_typed_name(name.as_str()) {
                continue;
            }

            let default_value = caps
                .get(2)
                .and_then(|_| default_argument(text, whole.end()));
            let coercion = call_close(text, whole.end())
                .and_then(|close| COERCION_RE.captures(&text[close + 1..]))
                .and_then(|c| c.get(1))
                .map(|kind| primitive_type(kind.as_str()));

            let field_type = converter_near(text, whole.start(), whole.end(), window)
                .or(coercion)
                .or_else(|| default_value.as_deref().and_then(literal_type))
                .unwrap_or(FieldType::Json);

            ctx.record(Candidate {
                name: name.as_str().to_string(),
                field_type,
                required: default_value.is_none(),
                default_value,
                offset: whole.start(),
            });
        }
    }
}

/// `contains("f")` for names nothing else recovered.
pub struct PresenceCheck;

impl PatternFamily for PresenceCheck {
    fn name(&self) -> &'static str {
        "presence check"
    }

    fn scan(&self, ctx: &mut ScanContext<'_>) {
        let text = ctx.text();
        for caps in CONTAINS_RE.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if ctx.has_name(name.as_str()) {
                continue;
            }

            ctx.record(Candidate {
                name: name.as_str().to_string(),
                field_type: FieldType::Untyped,
                required: false,
                default_value: None,
                offset: whole.start(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_one(family: &dyn PatternFamily, text: &str) -> Vec<lorebook_core::AssetField> {
        let mut ctx = ScanContext::new(text, 80);
        family.scan(&mut ctx);
        ctx.into_fields()
    }

    #[test]
    fn test_converter_type() {
        assert_eq!(converter_type("jsonToVec2F"), Some(FieldType::Vec2));
        assert_eq!(converter_type("jsonToColor"), Some(FieldType::Color));
        assert_eq!(converter_type("jsonToRectI"), Some(FieldType::Rect));
        assert_eq!(converter_type("jsonToPolyF"), Some(FieldType::Polygon));
        assert_eq!(converter_type("jsonToStringSet"), Some(FieldType::List));
        assert_eq!(converter_type("jsonToIntList"), Some(FieldType::List));
        assert_eq!(converter_type("jsonToWeightedPool"), Some(FieldType::WeightedPool));
        assert_eq!(converter_type("jsonToDirectives"), None);
        assert_eq!(converter_type("toVec2F"), None);
    }

    #[test]
    fn test_literal_type() {
        assert_eq!(literal_type("true"), Some(FieldType::Bool));
        assert_eq!(literal_type("JsonArray()"), Some(FieldType::Array));
        assert_eq!(literal_type("{}"), Some(FieldType::Object));
        assert_eq!(literal_type("1.5f"), Some(FieldType::Float));
        assert_eq!(literal_type("-2"), Some(FieldType::Int));
        assert_eq!(literal_type("\"idle\""), Some(FieldType::String));
        assert_eq!(literal_type("Vec2F()"), None);
    }

    #[test]
    fn test_default_with_nested_call() {
        let fields = scan_one(&TypedAccessor, r#"c.getFloat("speed", max(1.0f, base("x)")));"#);
        assert_eq!(fields[0].default_value.as_deref(), Some(r#"max(1.0f, base("x)"))"#));
    }

    #[test]
    fn test_wrapped_requires_known_converter() {
        assert!(scan_one(&ConverterWrappedAccessor, r#"jsonToDirectives(c.get("d"))"#).is_empty());

        let fields = scan_one(&ConverterWrappedAccessor, r#"jsonToColor(m_config->get("tint"))"#);
        assert_eq!(fields[0].field_type, FieldType::Color);
    }

    #[test]
    fn test_converter_window_respects_radius() {
        let near = r#"auto v = jsonToRectF(c.opt("box").value());"#;
        assert_eq!(scan_one(&GenericOptionalAccessor, near)[0].field_type, FieldType::Rect);

        let far = format!(r#"jsonToRectF(a); {} c.opt("box");"#, " ".repeat(200));
        assert_eq!(scan_one(&GenericOptionalAccessor, &far)[0].field_type, FieldType::Json);
    }

    #[test]
    fn test_family_order() {
        let names: Vec<&str> = FAMILIES.iter().map(|f| f.name()).collect();
        assert_eq!(names.first(), Some(&"typed accessor"));
        assert_eq!(names.last(), Some(&"presence check"));
        assert_eq!(names.len(), 6);
    }
}
