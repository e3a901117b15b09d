//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.solcompare.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Data source settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "solcompare_report.md".to_string()
}

/// One site dataset entry: a label and the CSV file backing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteEntry {
    /// Site label used to tag combined rows.
    pub name: String,
    /// Path to the site's CSV file.
    pub path: String,
}

/// Data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Site datasets, in the order they should be combined.
    #[serde(default)]
    pub sites: Vec<SiteEntry>,

    /// Name of the provenance column attached to combined rows.
    #[serde(default = "default_group_col")]
    pub group_col: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            sites: Vec::new(),
            group_col: default_group_col(),
        }
    }
}

fn default_group_col() -> String {
    "site".to_string()
}

/// Analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Metric columns to summarize and test.
    #[serde(default = "default_metrics")]
    pub metrics: Vec<String>,

    /// Statistics to compute per group.
    #[serde(default = "default_stats")]
    pub stats: Vec<String>,

    /// Log a significance interpretation next to each ANOVA result.
    #[serde(default)]
    pub interpret: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            metrics: default_metrics(),
            stats: default_stats(),
            interpret: false,
        }
    }
}

fn default_metrics() -> Vec<String> {
    crate::analysis::DEFAULT_METRICS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_stats() -> Vec<String> {
    vec!["mean".to_string(), "median".to_string(), "std".to_string()]
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".solcompare.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Sites on the command line replace the configured list entirely.
        if let Ok(pairs) = args.site_pairs() {
            if !pairs.is_empty() {
                self.data.sites = pairs
                    .into_iter()
                    .map(|(name, path)| SiteEntry {
                        name,
                        path: path.display().to_string(),
                    })
                    .collect();
            }
        }

        // Optional settings - only override if provided
        if let Some(ref metrics) = args.metrics {
            self.analysis.metrics = metrics.clone();
        }
        if let Some(ref stats) = args.stats {
            self.analysis.stats = stats.clone();
        }
        if let Some(ref group_col) = args.group_col {
            self.data.group_col = group_col.clone();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        // Flags always override
        if args.interpret {
            self.analysis.interpret = true;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let mut config = Config::default();
        config.data.sites = vec![
            SiteEntry {
                name: "Benin".to_string(),
                path: "data/benin-malanville_clean.csv".to_string(),
            },
            SiteEntry {
                name: "Togo".to_string(),
                path: "data/togo-dapaong_qc_clean.csv".to_string(),
            },
            SiteEntry {
                name: "Sierra Leone".to_string(),
                path: "data/sierraleone-bumbuna_clean.csv".to_string(),
            },
        ];
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
