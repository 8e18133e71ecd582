//! Search command - full-text search over the knowledge store.

use super::{get_database, load_config, truncate};
use anyhow::{Context, Result};
use colored::Colorize;
use lorebook_core::EntityKind;
use lorebook_db::SearchHit;

pub fn run(database: Option<&str>, query: &str, limit: i64, raw: bool) -> Result<()> {
    let config = load_config()?;
    let db = get_database(database, &config)?;

    let match_expr = if raw {
        query.trim().to_string()
    } else {
        quote_terms(query)
    };
    if match_expr.is_empty() {
        anyhow::bail!("Search query is empty");
    }

    println!("{} \"{}\"", "Searching for:".cyan().bold(), query);
    println!("{}", "─".repeat(70));

    let hits = db
        .search(&match_expr, Some(limit))
        .context("Search failed (use --raw only with valid full-text syntax)")?;

    if hits.is_empty() {
        println!();
        println!("{}", "No results found.".dimmed());
        println!();
        println!("Tips:");
        println!("  • Try different keywords");
        println!("  • Check what has been extracted with 'lorebook stats'");
        return Ok(());
    }

    println!();
    println!(
        "Found {} result{}",
        hits.len().to_string().green(),
        if hits.len() == 1 { "" } else { "s" }
    );
    println!();

    for hit in &hits {
        print_hit(hit);
    }

    Ok(())
}

/// Quote each whitespace-separated term so punctuation such as `.` is
/// matched literally instead of parsed as query syntax.
fn quote_terms(query: &str) -> String {
    query
        .split_whitespace()
        .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_hit(hit: &SearchHit) {
    let label = match hit.kind {
        Some(EntityKind::ApiFunction) => "api",
        Some(EntityKind::AssetField) => "field",
        Some(EntityKind::Recipe) => "recipe",
        Some(EntityKind::Extraction) => "extract",
        Some(EntityKind::ResearchNode) => "research",
        None => "other",
    };

    println!(
        "{} {} {}",
        format!("[{}]", label).cyan(),
        hit.name.white().bold(),
        format!("({})", hit.source).dimmed()
    );
    println!("  {}", truncate(&hit.body, 100).dimmed());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_terms() {
        assert_eq!(quote_terms("world.spawnItem"), "\"world.spawnItem\"");
        assert_eq!(quote_terms("  iron   bar "), "\"iron\" \"bar\"");
        assert_eq!(quote_terms("say \"hi\""), "\"say\" \"\"\"hi\"\"\"");
        assert_eq!(quote_terms("   "), "");
    }
}
