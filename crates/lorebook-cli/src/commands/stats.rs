//! Stats command - show knowledge store statistics.

use super::{database_path, format_size, get_database, load_config};
use anyhow::Result;
use colored::Colorize;

pub fn run(database: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let db = get_database(database, &config)?;
    let stats = db.get_stats()?;

    println!("{}", "Lorebook Statistics".cyan().bold());
    println!("{}", "─".repeat(50));

    println!();
    println!("{}", "Sources".white().bold());
    let sources = db.list_sources()?;
    if sources.is_empty() {
        println!("  {}", "None yet".dimmed());
    }
    for source in &sources {
        let version = source
            .version
            .as_deref()
            .map(|v| format!(" {}", v))
            .unwrap_or_default();
        println!("  {}{}", source.name.green(), version.dimmed());
    }

    println!();
    println!("{}", "Scripting API".white().bold());
    println!("  Tables: {}", stats.api_tables);
    println!("  Functions: {}", stats.api_functions.to_string().green());

    println!();
    println!("{}", "Asset Schemas".white().bold());
    println!("  Types: {}", stats.asset_types);
    println!("  Fields: {}", stats.asset_fields.to_string().green());

    println!();
    println!("{}", "Crafting".white().bold());
    println!("  Recipes: {}", stats.recipes);
    println!("  Extraction records: {}", stats.extraction_records);
    println!("  Research nodes: {}", stats.research_nodes);

    println!();
    println!("{}", "Storage".white().bold());
    println!("  Search entries: {}", stats.search_entries);
    println!("  Database size: {}", format_size(stats.database_size_bytes));
    println!(
        "  Location: {}",
        database_path(database, &config)?.display()
    );

    Ok(())
}
