//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// SolCompare - cross-site solar irradiance comparison toolkit
///
/// Load per-site measurement CSVs, merge them into one site-tagged
/// dataset, compute grouped summary statistics, and test across-site
/// differences with a one-way ANOVA. Markdown/JSON reports.
///
/// Examples:
///   solcompare --site Benin=data/benin_clean.csv --site Togo=data/togo_clean.csv
///   solcompare --config .solcompare.toml --metrics GHI,DNI --format json
///   solcompare --site Benin=data/benin_clean.csv --dry-run
///   solcompare --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Site dataset as NAME=PATH (repeatable)
    ///
    /// Example: --site Benin=data/benin-malanville_clean.csv
    /// Sites given on the command line replace the ones in the config file.
    #[arg(short, long, value_name = "NAME=PATH")]
    pub site: Vec<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .solcompare.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Metric columns to analyze (comma-separated)
    ///
    /// Example: --metrics GHI,DNI,DHI
    #[arg(short, long, value_name = "COLS", value_delimiter = ',')]
    pub metrics: Option<Vec<String>>,

    /// Statistics to compute per group (comma-separated)
    ///
    /// Supported: mean, median, std
    #[arg(long, value_name = "STATS", value_delimiter = ',')]
    pub stats: Option<Vec<String>>,

    /// Column used to group rows by site
    #[arg(short, long, value_name = "COL")]
    pub group_col: Option<String>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Log a significance interpretation next to each ANOVA result
    #[arg(long)]
    pub interpret: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: load the site datasets and print their shapes, no analysis
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .solcompare.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses the `--site NAME=PATH` arguments into ordered pairs.
    pub fn site_pairs(&self) -> Result<Vec<(String, PathBuf)>, String> {
        self.site
            .iter()
            .map(|entry| match entry.split_once('=') {
                Some((name, path)) if !name.trim().is_empty() && !path.trim().is_empty() => {
                    Ok((name.trim().to_string(), PathBuf::from(path.trim())))
                }
                _ => Err(format!(
                    "Invalid --site value '{}': expected NAME=PATH",
                    entry
                )),
            })
            .collect()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        self.site_pairs()?;

        if let Some(ref metrics) = self.metrics {
            if metrics.iter().any(|m| m.trim().is_empty()) {
                return Err("Metric names must not be empty".to_string());
            }
        }

        if let Some(ref group_col) = self.group_col {
            if group_col.trim().is_empty() {
                return Err("Group column name must not be empty".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
