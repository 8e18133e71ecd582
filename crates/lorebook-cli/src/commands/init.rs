//! Initialize Lorebook.

use super::{database_path, get_paths};
use anyhow::{Context, Result};
use colored::Colorize;
use lorebook_config::Config;
use lorebook_db::Database;

pub fn run(database: Option<&str>) -> Result<()> {
    let paths = get_paths()?;

    if paths.is_initialized() && database.is_none() {
        println!("{} Lorebook is already initialized.", "Note:".yellow().bold());
        println!("  Config: {}", paths.config_file.display());
        println!("  Database: {}", paths.database_file.display());
        return Ok(());
    }

    println!("{}", "Initializing Lorebook...".cyan().bold());

    paths.ensure_dirs().context("Failed to create directories")?;
    println!("  {} Created directories", "✓".green());

    if paths.config_file.exists() {
        println!(
            "  {} Keeping existing config: {}",
            "✓".green(),
            paths.config_file.display()
        );
    } else {
        Config::create_default_file(&paths.config_file).context("Failed to create config file")?;
        println!(
            "  {} Created config: {}",
            "✓".green(),
            paths.config_file.display()
        );
    }

    let config = Config::load_from(&paths.config_file).context("Failed to load config")?;
    let db_path = database_path(database, &config)?;
    let _db = Database::open(&db_path).context("Failed to initialize database")?;
    println!("  {} Created database: {}", "✓".green(), db_path.display());

    println!();
    println!("{}", "Lorebook initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Extract API docs: {}", "lorebook api ./docs/lua".cyan());
    println!("  2. Extract asset schemas: {}", "lorebook assets ./source".cyan());
    println!("  3. Extract recipes: {}", "lorebook recipes ./assets".cyan());
    println!("  4. Search: {}", "lorebook search spawnItem".cyan());

    Ok(())
}
