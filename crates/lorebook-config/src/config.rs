//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub recipes: RecipesConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path.
    ///
    /// A missing file yields the defaults. The loaded values are validated.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &Path) -> ConfigResult<()> {
        let default_config = Self::default_config_string();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, default_config)?;
        Ok(())
    }

    /// Reject policy values the extractors cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.extraction.converter_window == 0 {
            return Err(ConfigError::Invalid(
                "extraction.converter_window must be greater than zero".to_string(),
            ));
        }

        let rarity = &self.policy.rarity;
        let ordered = [rarity.common, rarity.uncommon, rarity.rare, rarity.rarest];
        if ordered.iter().any(|p| !(*p > 0.0 && *p <= 1.0)) {
            return Err(ConfigError::Invalid(
                "policy.rarity probabilities must lie in (0, 1]".to_string(),
            ));
        }
        if ordered.windows(2).any(|pair| pair[0] <= pair[1]) {
            return Err(ConfigError::Invalid(
                "policy.rarity must be strictly decreasing from common to rarest".to_string(),
            ));
        }

        if self.recipes.research_marker.is_empty() {
            return Err(ConfigError::Invalid(
                "recipes.research_marker must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Lorebook Configuration
# Extraction pipeline for game reference data

[general]
# Data directory for the knowledge store
# data_dir = "~/.local/share/lorebook"

# Explicit database file (overrides data_dir)
# database = "~/lorebook.db"

[extraction]
# Characters searched on each side of an accessor for a converter call
converter_window = 80

[policy]
# How overloaded signatures pick their canonical parameter list:
# "more-params" replaces it when an overload has strictly more parameters,
# "keep-first" always keeps the first signature's parameters
overload = "more-params"

[policy.rarity]
# Approximate probability per centrifuge rarity tier (strictly decreasing)
common = 0.9
uncommon = 0.5
rare = 0.2
rarest = 0.05

[recipes]
# Plain recipe file extension
recipe_extension = "recipe"

# Centrifuge table, relative to the ingested root
centrifuge_file = "objects/generic/centrifuge_recipes.config"

# Top-level key marking research tree files
research_marker = "researchTree"

# Key holding display names and descriptions in research files
strings_key = "strings"

# Centrifuge table key -> method label
[recipes.centrifuge_methods]
itemMapFarm = "centrifuge_farm"
itemMapBees = "centrifuge_bees"
itemMapLiquids = "centrifuge_liquids"
itemMapPowder = "centrifuge_powder"
itemMapRocks = "centrifuge_rocks"
itemMapIsotopes = "centrifuge_isotopes"

# Lab recipe files; each is optional
[[recipes.lab_files]]
path = "objects/generic/extractionlab_recipes.config"
method = "extraction"
list_key = "recipes"

[[recipes.lab_files]]
path = "objects/generic/xenolab_recipes.config"
method = "xenolab"
list_key = "recipes"

[sources]
# Default source names per pipeline entry point
api = "api-docs"
assets = "engine-source"
recipes = "base-game"

[ui]
# Enable colored output
color = true
"#
        .to_string()
    }
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub data_dir: Option<String>,
    pub database: Option<String>,
}

/// Heuristic field extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub converter_window: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { converter_window: 80 }
    }
}

/// Which overload supplies the canonical parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverloadPolicy {
    /// Replace the parameters and return type when an overload has strictly more parameters.
    #[default]
    MoreParams,
    /// Keep the first signature's parameters and return type.
    KeepFirst,
}

impl OverloadPolicy {
    /// Whether an overload with `incoming` params replaces one with `current` params.
    pub fn replaces(&self, current: usize, incoming: usize) -> bool {
        match self {
            OverloadPolicy::MoreParams => incoming > current,
            OverloadPolicy::KeepFirst => false,
        }
    }
}

/// Rarity tier to probability table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RarityTable {
    pub common: f64,
    pub uncommon: f64,
    pub rare: f64,
    pub rarest: f64,
}

impl Default for RarityTable {
    fn default() -> Self {
        Self {
            common: 0.9,
            uncommon: 0.5,
            rare: 0.2,
            rarest: 0.05,
        }
    }
}

impl RarityTable {
    /// Probability for a tier name; unknown tiers yield `None`.
    pub fn probability(&self, tier: &str) -> Option<f64> {
        match tier {
            "common" => Some(self.common),
            "uncommon" => Some(self.uncommon),
            "rare" => Some(self.rare),
            "rarest" => Some(self.rarest),
            _ => None,
        }
    }
}

/// Policy tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub overload: OverloadPolicy,
    pub rarity: RarityTable,
}

/// One lab recipe file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabFileConfig {
    pub path: String,
    pub method: String,
    #[serde(default = "default_list_key")]
    pub list_key: String,
}

fn default_list_key() -> String {
    "recipes".to_string()
}

/// Recipe and research extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipesConfig {
    pub recipe_extension: String,
    pub centrifuge_file: String,
    pub research_marker: String,
    pub strings_key: String,
    pub centrifuge_methods: BTreeMap<String, String>,
    pub lab_files: Vec<LabFileConfig>,
}

impl Default for RecipesConfig {
    fn default() -> Self {
        let centrifuge_methods = [
            ("itemMapFarm", "centrifuge_farm"),
            ("itemMapBees", "centrifuge_bees"),
            ("itemMapLiquids", "centrifuge_liquids"),
            ("itemMapPowder", "centrifuge_powder"),
            ("itemMapRocks", "centrifuge_rocks"),
            ("itemMapIsotopes", "centrifuge_isotopes"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            recipe_extension: "recipe".to_string(),
            centrifuge_file: "objects/generic/centrifuge_recipes.config".to_string(),
            research_marker: "researchTree".to_string(),
            strings_key: "strings".to_string(),
            centrifuge_methods,
            lab_files: vec![
                LabFileConfig {
                    path: "objects/generic/extractionlab_recipes.config".to_string(),
                    method: "extraction".to_string(),
                    list_key: default_list_key(),
                },
                LabFileConfig {
                    path: "objects/generic/xenolab_recipes.config".to_string(),
                    method: "xenolab".to_string(),
                    list_key: default_list_key(),
                },
            ],
        }
    }
}

/// Default source names per entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub api: String,
    pub assets: String,
    pub recipes: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            api: "api-docs".to_string(),
            assets: "engine-source".to_string(),
            recipes: "base-game".to_string(),
        }
    }
}

/// UI/Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub color: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.extraction.converter_window, 80);
        assert_eq!(config.policy.overload, OverloadPolicy::MoreParams);
        assert_eq!(config.recipes.lab_files.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_string_matches_defaults() {
        let parsed: Config = toml::from_str(&Config::default_config_string()).unwrap();
        let defaults = Config::default();

        assert_eq!(parsed.policy.rarity, defaults.policy.rarity);
        assert_eq!(parsed.recipes.centrifuge_methods, defaults.recipes.centrifuge_methods);
        assert_eq!(parsed.recipes.lab_files, defaults.recipes.lab_files);
        assert_eq!(parsed.sources.recipes, defaults.sources.recipes);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(config.recipes.centrifuge_file, deserialized.recipes.centrifuge_file);
        assert_eq!(config.policy.overload, deserialized.policy.overload);
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
            [policy]
            overload = "keep-first"

            [extraction]
            converter_window = 40
            "#
        )
        .unwrap();

        let config = Config::load_from(temp_file.path()).unwrap();

        assert_eq!(config.policy.overload, OverloadPolicy::KeepFirst);
        assert_eq!(config.extraction.converter_window, 40);
        // Defaults should still work
        assert_eq!(config.policy.rarity.common, 0.9);
    }

    #[test]
    fn test_rarity_must_decrease() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
            [policy.rarity]
            common = 0.5
            uncommon = 0.5
            "#
        )
        .unwrap();

        assert!(matches!(
            Config::load_from(temp_file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut config = Config::default();
        config.extraction.converter_window = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rarity_lookup() {
        let rarity = RarityTable::default();
        assert_eq!(rarity.probability("common"), Some(0.9));
        assert_eq!(rarity.probability("rarest"), Some(0.05));
        assert_eq!(rarity.probability("legendary"), None);
    }

    #[test]
    fn test_overload_policy() {
        assert!(OverloadPolicy::MoreParams.replaces(1, 3));
        assert!(!OverloadPolicy::MoreParams.replaces(3, 3));
        assert!(!OverloadPolicy::KeepFirst.replaces(1, 3));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.sources.api, "api-docs");
    }
}
