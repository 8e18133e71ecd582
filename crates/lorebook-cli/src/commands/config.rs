//! Configuration commands.

use super::get_paths;
use anyhow::{Context, Result};
use colored::Colorize;
use lorebook_config::{Config, OverloadPolicy};

pub fn show() -> Result<()> {
    let paths = get_paths()?;

    if !paths.config_file.exists() {
        println!("{}", "Default Configuration".cyan().bold());
        println!("{}", "─".repeat(50));
        println!(
            "{} No config file at {}. Run 'lorebook init' to create one.",
            "Note:".yellow(),
            paths.config_file.display()
        );
        println!();
        println!("{}", Config::default_config_string());
        return Ok(());
    }

    let contents =
        std::fs::read_to_string(&paths.config_file).context("Failed to read config file")?;

    println!("{}", "Current Configuration".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("{}", contents);

    Ok(())
}

pub fn path() -> Result<()> {
    let paths = get_paths()?;
    println!("{}", paths.config_file.display());
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let paths = get_paths()?;

    let mut config = Config::load_from(&paths.config_file).context("Failed to load config")?;

    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "data_dir"] => config.general.data_dir = Some(value.to_string()),
        ["general", "database"] => config.general.database = Some(value.to_string()),
        ["extraction", "converter_window"] => {
            config.extraction.converter_window =
                value.parse().context("Invalid converter_window value")?;
        }
        ["policy", "overload"] => {
            config.policy.overload = match value {
                "more-params" => OverloadPolicy::MoreParams,
                "keep-first" => OverloadPolicy::KeepFirst,
                _ => anyhow::bail!("Invalid overload policy: {} (more-params, keep-first)", value),
            };
        }
        ["policy", "rarity", tier] => {
            let probability: f64 = value.parse().context("Invalid probability value")?;
            let rarity = &mut config.policy.rarity;
            match *tier {
                "common" => rarity.common = probability,
                "uncommon" => rarity.uncommon = probability,
                "rare" => rarity.rare = probability,
                "rarest" => rarity.rarest = probability,
                _ => anyhow::bail!("Unknown rarity tier: {}", tier),
            }
        }
        ["recipes", "research_marker"] => config.recipes.research_marker = value.to_string(),
        ["recipes", "strings_key"] => config.recipes.strings_key = value.to_string(),
        ["recipes", "centrifuge_file"] => config.recipes.centrifuge_file = value.to_string(),
        ["sources", "api"] => config.sources.api = value.to_string(),
        ["sources", "assets"] => config.sources.assets = value.to_string(),
        ["sources", "recipes"] => config.sources.recipes = value.to_string(),
        ["ui", "color"] => {
            config.ui.color = value.parse().context("Invalid boolean value")?;
        }
        _ => {
            anyhow::bail!("Unknown config key: {}", key);
        }
    }

    config.validate().context("Rejected config value")?;
    config
        .save_to(&paths.config_file)
        .context("Failed to save config")?;

    println!("{} Set {} = {}", "✓".green(), key.cyan(), value);

    Ok(())
}
