//! Function-signature extraction from Markdown API reference pages.
//!
//! Signatures live in depth 3 or 4 headings such as
//! ``#### `EntityId` world.spawnItem(`ItemDescriptor` item, [`Json` parameters])``.
//! Everything up to the next signature heading (or a horizontal rule) is the
//! description; fenced code inside it becomes examples. Consecutive headings
//! for the same function are merged as overloads.

use lorebook_config::OverloadPolicy;
use lorebook_core::{ApiFunction, ApiParam, ApiTable, Provenance};
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag};
use regex::Regex;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::LazyLock;
use tracing::debug;

/// Return type recorded for signatures that declare none.
pub const VOID_RETURN: &str = "void";

/// Label joining an overload's description onto the canonical one.
const OVERLOAD_LABEL: &str = "Overload:";

/// Context tag for tables missing from the context map.
pub const UNKNOWN_CONTEXT: &str = "unknown";

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{3,4}[ \t]+(.+?)(?:[ \t]+#+)?\s*$").expect("valid regex"));

static SIGNATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:`([^`]+)`\s+)?`?([A-Za-z_][\w.]*)\.([A-Za-z_]\w*)\s*\((.*)\)`?$")
        .expect("valid regex")
});

static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\.\.\.)?[A-Za-z_]\w*$").expect("valid regex"));

/// Which script contexts can call each documented table.
static CONTEXT_MAP: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("root", "universal"),
        ("sb", "universal"),
        ("world", "universal"),
        ("entity", "universal"),
        ("config", "universal"),
        ("message", "universal"),
        ("script", "universal"),
        ("mcontroller", "universal"),
        ("animator", "universal"),
        ("status", "universal"),
        ("player", "player"),
        ("playerCompanions", "player"),
        ("celestial", "client"),
        ("interface", "client"),
        ("localAnimator", "client"),
        ("pane", "scriptpane"),
        ("widget", "scriptpane"),
        ("activeItem", "activeitem"),
        ("activeItemAnimation", "activeitem"),
        ("item", "item"),
        ("object", "object"),
        ("objectAnimator", "object"),
        ("monster", "monster"),
        ("npc", "npc"),
        ("projectile", "projectile"),
        ("vehicle", "vehicle"),
        ("tech", "tech"),
        ("effect", "statuseffect"),
        ("quest", "quest"),
        ("stagehand", "stagehand"),
        ("commandProcessor", "server"),
        ("universe", "server"),
    ])
});

/// Context tag of a table; dotted tables fall back to their first segment.
pub fn context_for(table: &str) -> &'static str {
    if let Some(context) = CONTEXT_MAP.get(table) {
        return *context;
    }
    table
        .split('.')
        .next()
        .and_then(|head| CONTEXT_MAP.get(head))
        .copied()
        .unwrap_or(UNKNOWN_CONTEXT)
}

/// A parsed signature heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub text: String,
    pub return_type: String,
    pub table: String,
    pub name: String,
    pub params: Vec<ApiParam>,
}

/// Parse a heading line into a signature, if it is one.
pub fn parse_heading(line: &str) -> Option<Signature> {
    let content = HEADING_RE.captures(line)?.get(1)?.as_str();
    if !content.contains('`') || !content.contains('(') {
        return None;
    }

    let caps = SIGNATURE_RE.captures(content)?;
    let return_type = caps
        .get(1)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| VOID_RETURN.to_string());

    Some(Signature {
        text: content.to_string(),
        return_type,
        table: caps[2].to_string(),
        name: caps[3].to_string(),
        params: parse_params(&caps[4]),
    })
}

/// Split on commas that are not nested in `<>`, `()` or backticks.
fn split_top_level(params: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0i32;
    let mut in_tick = false;
    let mut start = 0;

    for (i, c) in params.char_indices() {
        match c {
            '`' => in_tick = !in_tick,
            '<' | '(' if !in_tick => depth += 1,
            '>' | ')' if !in_tick => depth -= 1,
            ',' if !in_tick && depth <= 0 => {
                pieces.push(&params[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&params[start..]);
    pieces
}

/// Parse `[`Type` name, Type name]`-style parameter lists.
///
/// A `[` left open marks every following parameter optional until the `]`.
/// Fragments without a recognizable type and name are skipped.
pub fn parse_params(params: &str) -> Vec<ApiParam> {
    if params.trim().is_empty() {
        return Vec::new();
    }

    let mut parsed = Vec::new();
    let mut in_optional = false;

    for piece in split_top_level(params) {
        let mut fragment = piece.trim();

        let mut opens = false;
        while let Some(rest) = fragment.strip_prefix('[') {
            opens = true;
            fragment = rest.trim_start();
        }
        let mut closes = false;
        while let Some(rest) = fragment.strip_suffix(']') {
            closes = true;
            fragment = rest.trim_end();
        }

        let optional = in_optional || opens || closes;
        if opens && !closes {
            in_optional = true;
        }
        if closes {
            in_optional = false;
        }

        match parse_typed_name(fragment) {
            Some((param_type, name)) => parsed.push(ApiParam::new(name, param_type, optional)),
            None => debug!("Skipping unparseable parameter: {:?}", piece),
        }
    }

    parsed
}

fn parse_typed_name(fragment: &str) -> Option<(String, String)> {
    let (param_type, name) = if let Some(rest) = fragment.strip_prefix('`') {
        let close = rest.find('`')?;
        (rest[..close].trim(), rest[close + 1..].trim())
    } else {
        let split = fragment.rfind(char::is_whitespace)?;
        (fragment[..split].trim(), fragment[split..].trim())
    };

    if param_type.is_empty() || !IDENT_RE.is_match(name) {
        return None;
    }
    Some((param_type.to_string(), name.to_string()))
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

fn is_rule(line: &str) -> bool {
    let trimmed: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    trimmed.len() >= 3
        && ['-', '*', '_']
            .iter()
            .any(|rule| trimmed.chars().all(|c| c == *rule))
}

/// Pull fenced code blocks out of a description.
///
/// Returns the remaining text (trimmed, blank runs collapsed) and the code
/// of each fenced block verbatim.
pub fn split_examples(description: &str) -> (String, Vec<String>) {
    let mut examples = Vec::new();
    let mut removed: Vec<Range<usize>> = Vec::new();
    let mut current: Option<String> = None;

    for (event, range) in Parser::new(description).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(_))) => {
                current = Some(String::new());
                removed.push(range);
            }
            Event::Text(text) => {
                if let Some(code) = current.as_mut() {
                    code.push_str(&text);
                }
            }
            Event::End(Tag::CodeBlock(CodeBlockKind::Fenced(_))) => {
                if let Some(code) = current.take() {
                    examples.push(code.trim_end_matches('\n').to_string());
                }
            }
            _ => {}
        }
    }

    let mut remaining = String::with_capacity(description.len());
    let mut cursor = 0;
    for range in removed {
        if range.start >= cursor {
            remaining.push_str(&description[cursor..range.start]);
            cursor = range.end;
        }
    }
    remaining.push_str(&description[cursor.min(description.len())..]);

    (collapse_blank_lines(&remaining), examples)
}

fn collapse_blank_lines(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim_end) {
        if line.is_empty() && lines.last().map_or(true, |prev| prev.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    lines.join("\n").trim().to_string()
}

/// Extracts API functions from Markdown reference pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureExtractor {
    policy: OverloadPolicy,
}

impl SignatureExtractor {
    pub fn new(policy: OverloadPolicy) -> Self {
        Self { policy }
    }

    /// Extract every documented function of one file, overloads merged.
    pub fn extract(&self, file_name: &str, text: &str) -> Vec<ApiFunction> {
        let lines: Vec<&str> = text.lines().collect();
        let mut functions: Vec<ApiFunction> = Vec::new();
        let mut i = 0;
        let mut outer_fence = false;

        while i < lines.len() {
            if is_fence(lines[i]) {
                outer_fence = !outer_fence;
                i += 1;
                continue;
            }
            if outer_fence {
                i += 1;
                continue;
            }
            let Some(signature) = parse_heading(lines[i]) else {
                i += 1;
                continue;
            };
            let heading_line = i + 1;
            i += 1;

            let mut body: Vec<&str> = Vec::new();
            let mut in_fence = false;
            while i < lines.len() {
                let line = lines[i];
                if is_fence(line) {
                    in_fence = !in_fence;
                } else if !in_fence {
                    if parse_heading(line).is_some() {
                        break;
                    }
                    if is_rule(line) {
                        i += 1;
                        break;
                    }
                }
                body.push(line);
                i += 1;
            }

            let (description, examples) = split_examples(&body.join("\n"));
            let function = ApiFunction {
                table: signature.table,
                name: signature.name,
                signature: signature.text,
                description,
                return_type: signature.return_type,
                params: signature.params,
                examples,
                notes: None,
                provenance: vec![Provenance {
                    file: file_name.to_string(),
                    line: heading_line,
                }],
            };

            match functions.last_mut() {
                Some(prev) if prev.table == function.table && prev.name == function.name => {
                    self.merge_overload(prev, function)
                }
                _ => functions.push(function),
            }
        }

        functions
    }

    fn merge_overload(&self, canonical: &mut ApiFunction, overload: ApiFunction) {
        canonical.signature = format!("{}\n{}", canonical.signature, overload.signature);

        if !overload.description.is_empty() {
            canonical.description = if canonical.description.is_empty() {
                format!("{} {}", OVERLOAD_LABEL, overload.description)
            } else {
                format!(
                    "{}\n\n{} {}",
                    canonical.description, OVERLOAD_LABEL, overload.description
                )
            };
        }

        if self
            .policy
            .replaces(canonical.params.len(), overload.params.len())
        {
            canonical.params = overload.params;
            canonical.return_type = overload.return_type;
        }

        canonical.examples.extend(overload.examples);
        canonical.provenance.extend(overload.provenance);
    }
}

/// Group functions into tables in first-seen order, tagging each table's context.
pub fn group_into_tables(functions: Vec<ApiFunction>) -> Vec<ApiTable> {
    let mut tables: Vec<ApiTable> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for function in functions {
        let slot = *index.entry(function.table.clone()).or_insert_with(|| {
            tables.push(ApiTable::new(
                function.table.clone(),
                context_for(&function.table),
            ));
            tables.len() - 1
        });
        tables[slot].functions.push(function);
    }

    tables
}
