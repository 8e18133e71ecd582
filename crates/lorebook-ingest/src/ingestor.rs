//! Pipeline entry points.
//!
//! Each entry point first extracts everything from the root (no store
//! access), then writes each record family in its own batch. The `extract_*`
//! functions are the dry-run half and can be used on their own.

use crate::discovery::{find_files, read_text, relative_path};
use crate::error::{IngestError, IngestResult};
use crate::fields::{asset_type_for, FieldExtractor};
use crate::markdown::{group_into_tables, SignatureExtractor};
use crate::recipes::research::{collect_nodes, derive_prerequisites, is_research_file, ResearchFile};
use crate::recipes::{centrifuge, lab, plain};
use crate::sanitize::read_json_file;
use lorebook_config::Config;
use lorebook_core::{ApiTable, AssetType, ExtractionRecord, Recipe, ResearchNode, Source};
use lorebook_db::{BatchOutcome, Database};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info, warn};

/// What one run found, skipped and wrote.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub files_scanned: usize,
    /// Files or records dropped as malformed.
    pub files_skipped: usize,
    /// Extracted record counts by family.
    pub extracted: BTreeMap<&'static str, usize>,
    pub written: usize,
    /// Rows the store already had (insert-or-ignore families).
    pub ignored: usize,
    /// Absent sub-sources and other operator-facing diagnostics.
    pub notices: Vec<String>,
}

impl RunReport {
    fn count(&mut self, family: &'static str, n: usize) {
        *self.extracted.entry(family).or_default() += n;
    }

    fn notice(&mut self, message: String) {
        warn!("{}", message);
        self.notices.push(message);
    }

    fn absorb(&mut self, outcome: BatchOutcome) {
        self.written += outcome.written;
        self.ignored += outcome.ignored;
    }

    /// Extracted count for a family, zero when absent.
    pub fn extracted(&self, family: &str) -> usize {
        self.extracted.get(family).copied().unwrap_or(0)
    }
}

/// Functions found under an API documentation root.
#[derive(Debug, Default)]
pub struct ApiExtraction {
    pub tables: Vec<ApiTable>,
    pub report: RunReport,
}

/// Asset schemas recovered from an engine source root.
#[derive(Debug, Default)]
pub struct AssetExtraction {
    pub types: Vec<AssetType>,
    pub report: RunReport,
}

/// Recipes, transformation records and research nodes from a content root.
#[derive(Debug, Default)]
pub struct RecipeExtraction {
    pub recipes: Vec<Recipe>,
    pub extraction_records: Vec<ExtractionRecord>,
    pub research_nodes: Vec<ResearchNode>,
    pub report: RunReport,
}

fn check_root(root: &Path) -> IngestResult<()> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(IngestError::RootNotFound(root.to_path_buf()))
    }
}

/// Extract API tables from every Markdown file under `root`.
pub fn extract_api(root: &Path, config: &Config) -> IngestResult<ApiExtraction> {
    check_root(root)?;

    let extractor = SignatureExtractor::new(config.policy.overload);
    let mut report = RunReport::default();
    let mut functions = Vec::new();

    for path in find_files(root, &["md", "markdown"]) {
        report.files_scanned += 1;
        let Some(text) = read_text(&path) else {
            report.files_skipped += 1;
            continue;
        };

        let found = extractor.extract(&relative_path(root, &path), &text);
        debug!("{} signatures in {}", found.len(), path.display());
        functions.extend(found);
    }

    if report.files_scanned == 0 {
        report.notice(format!("No Markdown files under {}", root.display()));
    }

    let tables = group_into_tables(functions);
    report.count("api_tables", tables.len());
    report.count("api_functions", tables.iter().map(|t| t.functions.len()).sum());

    Ok(ApiExtraction { tables, report })
}

/// Recover asset schemas from the known engine source files under `root`.
pub fn extract_assets(root: &Path, config: &Config) -> IngestResult<AssetExtraction> {
    check_root(root)?;

    let extractor = FieldExtractor::new(config.extraction.converter_window);
    let mut report = RunReport::default();
    let mut types: Vec<AssetType> = Vec::new();
    let mut index: HashMap<&'static str, usize> = HashMap::new();

    for path in find_files(root, &["cpp"]) {
        let Some(info) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(asset_type_for)
        else {
            continue;
        };

        report.files_scanned += 1;
        let Some(text) = read_text(&path) else {
            report.files_skipped += 1;
            continue;
        };

        let fields = extractor.extract(&text);
        debug!("{} field candidates in {}", fields.len(), path.display());

        let slot = *index.entry(info.name).or_insert_with(|| {
            types.push(AssetType {
                name: info.name.to_string(),
                extension: info.extension.to_string(),
                description: info.description.to_string(),
                base_path: info.base_path.to_string(),
                fields: Vec::new(),
            });
            types.len() - 1
        });
        types[slot].fields.extend(fields);
    }

    if report.files_scanned == 0 {
        report.notice(format!("No known engine source files under {}", root.display()));
    }

    report.count("asset_types", types.len());
    report.count("asset_fields", types.iter().map(|t| t.fields.len()).sum());

    Ok(AssetExtraction { types, report })
}

/// Extract recipes, centrifuge and lab records, and research trees under `root`.
pub fn extract_recipes(root: &Path, config: &Config) -> IngestResult<RecipeExtraction> {
    check_root(root)?;

    let settings = &config.recipes;
    let mut out = RecipeExtraction::default();

    // Plain recipes
    for path in find_files(root, &[settings.recipe_extension.as_str()]) {
        out.report.files_scanned += 1;
        let rel = relative_path(root, &path);
        match read_json_file(&path).and_then(|v| plain::parse_recipe(&v, Some(&rel))) {
            Some(recipe) => out.recipes.push(recipe),
            None => {
                debug!("Skipping unusable recipe {}", rel);
                out.report.files_skipped += 1;
            }
        }
    }
    out.report.count("recipes", out.recipes.len());

    // Centrifuge tables
    let centrifuge_path = root.join(&settings.centrifuge_file);
    if centrifuge_path.is_file() {
        out.report.files_scanned += 1;
        match read_json_file(&centrifuge_path) {
            Some(value) => {
                let records = centrifuge::parse_centrifuge(
                    &value,
                    &settings.centrifuge_methods,
                    &config.policy.rarity,
                );
                out.report.count("centrifuge_records", records.len());
                out.extraction_records.extend(records);
            }
            None => out.report.files_skipped += 1,
        }
    } else {
        out.report
            .notice(format!("Centrifuge file not found: {}", settings.centrifuge_file));
    }

    // Lab recipes
    for lab_file in &settings.lab_files {
        let path = root.join(&lab_file.path);
        if !path.is_file() {
            out.report
                .notice(format!("Lab recipe file not found: {}", lab_file.path));
            continue;
        }

        out.report.files_scanned += 1;
        let Some(value) = read_json_file(&path) else {
            out.report.files_skipped += 1;
            continue;
        };
        let Some(list) = lab::recipe_list(&value, &lab_file.list_key) else {
            out.report.notice(format!(
                "Lab recipe file {} is neither a list nor has a '{}' list",
                lab_file.path, lab_file.list_key
            ));
            continue;
        };

        let records: Vec<ExtractionRecord> = list
            .iter()
            .filter_map(|r| lab::parse_lab_recipe(r, &lab_file.method))
            .collect();
        out.report.count("lab_recipes_dropped", list.len() - records.len());
        out.report.count("lab_records", records.len());
        out.extraction_records.extend(records);
    }

    // Research trees
    let mut research_files = Vec::new();
    for path in find_files(root, &["config"]) {
        if let Some(value) = read_json_file(&path) {
            if is_research_file(&value, &settings.research_marker) {
                research_files.push(ResearchFile {
                    file: relative_path(root, &path),
                    value,
                });
            }
        }
    }
    out.report.files_scanned += research_files.len();

    let marker = settings.research_marker.as_str();
    let mut nodes = collect_nodes(&research_files, marker, &settings.strings_key);
    let dangling = derive_prerequisites(&research_files, marker, &mut nodes);
    out.report.count("duplicate_research_nodes", nodes.duplicates);
    out.report.count("dangling_children", dangling);
    out.report.count("research_nodes", nodes.len());
    out.research_nodes = nodes.into_nodes();

    out.report
        .count("extraction_records", out.extraction_records.len());

    Ok(out)
}

/// Runs the pipeline entry points against an explicitly opened store.
pub struct Ingestor {
    db: Database,
    config: Config,
}

impl Ingestor {
    pub fn new(db: Database, config: Config) -> Self {
        Self { db, config }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extract and store the scripting API documented under `root`.
    pub fn ingest_api(&self, root: &Path, source: &Source) -> IngestResult<RunReport> {
        let ApiExtraction { tables, mut report } = extract_api(root, &self.config)?;

        let source = self.db.get_or_create_source(source)?;
        report.absorb(self.db.store_api_tables(&source, &tables)?);

        info!(
            "Stored {} API functions from {} into source {}",
            report.written,
            root.display(),
            source.name
        );
        Ok(report)
    }

    /// Recover and store asset schemas from the engine sources under `root`.
    pub fn ingest_assets(&self, root: &Path, source: &Source) -> IngestResult<RunReport> {
        let AssetExtraction { types, mut report } = extract_assets(root, &self.config)?;

        let source = self.db.get_or_create_source(source)?;
        report.absorb(self.db.store_asset_types(&source, &types)?);

        info!(
            "Stored {} new asset fields ({} already known) into source {}",
            report.written, report.ignored, source.name
        );
        Ok(report)
    }

    /// Extract and store recipes, extraction records and research nodes.
    pub fn ingest_recipes(&self, root: &Path, source: &Source) -> IngestResult<RunReport> {
        let RecipeExtraction {
            recipes,
            extraction_records,
            research_nodes,
            mut report,
        } = extract_recipes(root, &self.config)?;

        let source = self.db.get_or_create_source(source)?;
        report.absorb(self.db.store_recipes(&source, &recipes)?);
        report.absorb(self.db.store_extraction_records(&source, &extraction_records)?);
        report.absorb(self.db.store_research_nodes(&source, &research_nodes)?);

        info!(
            "Stored {} recipe, extraction and research rows into source {}",
            report.written, source.name
        );
        Ok(report)
    }
}
