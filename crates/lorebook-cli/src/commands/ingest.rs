//! Ingest command implementation.

use super::{expand_path, load_config, open_database, truncate};
use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use lorebook_config::Config;
use lorebook_core::{AssetType, Source};
use lorebook_ingest::{extract_api, extract_assets, extract_recipes, Ingestor, RunReport};
use std::path::Path;

/// Which extraction pipeline to run.
#[derive(Debug, Clone, Copy)]
pub enum Pipeline {
    Api,
    Assets,
    Recipes,
}

impl Pipeline {
    fn label(&self) -> &'static str {
        match self {
            Pipeline::Api => "API docs",
            Pipeline::Assets => "asset schemas",
            Pipeline::Recipes => "recipes",
        }
    }

    fn default_source<'a>(&self, config: &'a Config) -> &'a str {
        match self {
            Pipeline::Api => &config.sources.api,
            Pipeline::Assets => &config.sources.assets,
            Pipeline::Recipes => &config.sources.recipes,
        }
    }
}

/// Options shared by the ingest subcommands.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub root: String,
    pub dry_run: bool,
    pub source: Option<String>,
    pub source_version: Option<String>,
    pub source_url: Option<String>,
    pub source_description: Option<String>,
}

impl IngestOptions {
    fn source_template(&self, pipeline: Pipeline, config: &Config) -> Source {
        let name = self
            .source
            .clone()
            .unwrap_or_else(|| pipeline.default_source(config).to_string());

        let mut source = Source::new(name);
        if let Some(version) = &self.source_version {
            source = source.with_version(version);
        }
        if let Some(url) = &self.source_url {
            source = source.with_url(url);
        }
        if let Some(description) = &self.source_description {
            source = source.with_description(description);
        }
        source
    }
}

/// Run one pipeline over a root directory.
pub fn run(pipeline: Pipeline, options: IngestOptions, database: Option<&str>) -> Result<()> {
    let config = load_config()?;

    let root = expand_path(&options.root);
    if !root.is_dir() {
        anyhow::bail!("Root directory does not exist: {}", root.display());
    }

    if options.dry_run {
        return dry_run(pipeline, &root, &config);
    }

    let source = options.source_template(pipeline, &config);
    let db = open_database(database, &config)?;
    let ingestor = Ingestor::new(db, config);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Extracting {} from {}", pipeline.label(), root.display()));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = match pipeline {
        Pipeline::Api => ingestor.ingest_api(&root, &source),
        Pipeline::Assets => ingestor.ingest_assets(&root, &source),
        Pipeline::Recipes => ingestor.ingest_recipes(&root, &source),
    };
    pb.finish_and_clear();
    let report = result?;

    println!(
        "{} {} into source '{}'",
        "Ingested:".green().bold(),
        pipeline.label(),
        source.name.cyan()
    );
    print_report(&report);
    println!(
        "  Written: {}  Ignored: {}",
        report.written.to_string().green(),
        report.ignored
    );

    Ok(())
}

fn dry_run(pipeline: Pipeline, root: &Path, config: &Config) -> Result<()> {
    println!(
        "{} {} from {}",
        "Would extract:".cyan(),
        pipeline.label(),
        root.display()
    );

    match pipeline {
        Pipeline::Api => {
            let extraction = extract_api(root, config)?;
            for table in &extraction.tables {
                println!(
                    "  {} ({}): {} functions",
                    table.name.cyan(),
                    table.context,
                    table.functions.len()
                );
            }
            print_report(&extraction.report);
        }
        Pipeline::Assets => {
            let extraction = extract_assets(root, config)?;
            for asset_type in &extraction.types {
                println!("  {}", asset_type_summary(asset_type));
                for field in &asset_type.fields {
                    let marker = if field.required { "*" } else { " " };
                    println!("    {} {}: {}", marker, field.path, field.field_type.as_str());
                }
            }
            print_report(&extraction.report);
        }
        Pipeline::Recipes => {
            let extraction = extract_recipes(root, config)?;
            for recipe in extraction.recipes.iter().take(10) {
                println!(
                    "  {} x{} <- {} inputs",
                    recipe.output.item.cyan(),
                    recipe.output.count,
                    recipe.inputs.len()
                );
            }
            if extraction.recipes.len() > 10 {
                println!("  ... and {} more recipes", extraction.recipes.len() - 10);
            }
            for node in extraction.research_nodes.iter().take(10) {
                let name = truncate(&node.name, 40);
                println!("  {} {}", node.qualified_id().cyan(), name);
            }
            print_report(&extraction.report);
        }
    }

    Ok(())
}

fn asset_type_summary(asset_type: &AssetType) -> String {
    format!(
        "{} ({}): {} fields",
        asset_type.name.cyan(),
        asset_type.extension,
        asset_type.fields.len()
    )
}

fn print_report(report: &RunReport) {
    println!(
        "  Files: {} scanned, {} skipped",
        report.files_scanned, report.files_skipped
    );
    for (family, count) in &report.extracted {
        println!("  {}: {}", family, count);
    }
    for notice in &report.notices {
        println!("  {} {}", "Note:".yellow(), notice);
    }
}
