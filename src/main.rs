//! SolCompare - cross-site solar irradiance comparison toolkit
//!
//! A CLI tool that loads per-site measurement CSVs, merges them into
//! one site-tagged dataset, computes grouped summary statistics, and
//! tests across-site differences with a one-way ANOVA.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, combine failure, write failure, etc.)
//!   2 - No valid site data could be loaded

use anyhow::{bail, Context, Result};
use chrono::Utc;
use solcompare::analysis::{self, Stat};
use solcompare::cli::{Args, OutputFormat};
use solcompare::config::Config;
use solcompare::frame::{DataFrame, Table};
use solcompare::loader;
use solcompare::report::{self, MetricComparison, Report, ReportMetadata};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("SolCompare v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the comparison
    match run_comparison(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Comparison failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .solcompare.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".solcompare.toml");

    if path.exists() {
        eprintln!("⚠️  .solcompare.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .solcompare.toml")?;

    println!("✅ Created .solcompare.toml with default settings.");
    println!("   Edit it to point at your site CSV files.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete comparison workflow. Returns exit code (0 or 2).
fn run_comparison(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    if config.data.sites.is_empty() {
        bail!("No site datasets configured. Use --site NAME=PATH or a .solcompare.toml file.");
    }

    // An unrecognized statistic name is a caller error; fail up front
    // before touching any data.
    let stats: Vec<Stat> = config
        .analysis
        .stats
        .iter()
        .map(|s| s.parse::<Stat>())
        .collect::<Result<_, _>>()?;
    let metrics = config.analysis.metrics.clone();
    let group_col = config.data.group_col.clone();

    // Step 1: Load the site datasets
    let pairs: Vec<(String, PathBuf)> = config
        .data
        .sites
        .iter()
        .map(|s| (s.name.clone(), PathBuf::from(&s.path)))
        .collect();

    println!("📥 Loading {} site dataset(s)...", pairs.len());
    let loaded = loader::load_sites(&pairs);

    if loaded.is_empty() {
        error!("No valid data files found.");
        eprintln!("\n⛔ No valid data files found. Nothing to compare (exit code 2).");
        return Ok(2);
    }
    if loaded.len() < pairs.len() {
        warn!(
            "{} site dataset(s) could not be loaded and were skipped.",
            pairs.len() - loaded.len()
        );
    }

    // Handle --dry-run: print shapes and exit
    if args.dry_run {
        return handle_dry_run(&loaded);
    }

    // Step 2: Combine into the unified dataset
    println!("🔗 Combining {} site dataset(s)...", loaded.len());
    let unified = analysis::combine(&loaded)?;
    info!(
        "Unified dataset: {} rows x {} columns.",
        unified.n_rows(),
        unified.n_cols()
    );

    // Step 3: Grouped summary statistics
    println!("📊 Computing summary statistics...");
    let (summary, summary_skipped) =
        match analysis::summarize(&unified, &metrics, &stats, &group_col) {
            Ok(table) => (Some(table), None),
            // Absence signal: the report notes the reason and moves on.
            Err(e) => (None, Some(e.to_string())),
        };

    // Step 4: Significance tests, one per metric
    println!("🧪 Running significance tests...");
    let comparisons: Vec<MetricComparison> = metrics
        .iter()
        .map(|metric| {
            match analysis::compare(&unified, &group_col, metric, config.analysis.interpret) {
                Ok(result) => MetricComparison {
                    metric: metric.clone(),
                    anova: Some(result),
                    skipped: None,
                },
                Err(e) => MetricComparison {
                    metric: metric.clone(),
                    anova: None,
                    skipped: Some(e.to_string()),
                },
            }
        })
        .collect();

    // Step 5: Build and write the report
    println!("📝 Generating report...");
    let duration = start_time.elapsed().as_secs_f64();

    let report = Report {
        metadata: ReportMetadata {
            sites: loaded.iter().map(|(name, _)| name.clone()).collect(),
            analysis_date: Utc::now(),
            group_col: group_col.clone(),
            total_rows: unified.n_rows(),
            duration_seconds: duration,
        },
        site_rows: loaded
            .iter()
            .map(|(name, df)| (name.clone(), df.n_rows()))
            .collect(),
        summary,
        summary_skipped,
        comparisons,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    let output_path = PathBuf::from(&config.general.output);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Print summary
    let tested = report.comparisons.iter().filter(|c| c.anova.is_some()).count();
    let significant = report
        .comparisons
        .iter()
        .filter(|c| c.anova.map(|a| a.is_significant()).unwrap_or(false))
        .count();

    println!("\n📊 Comparison Summary:");
    println!("   Sites: {}", report.metadata.sites.join(", "));
    println!("   Unified rows: {}", report.metadata.total_rows);
    println!(
        "   Metrics tested: {} of {} | significant: {}",
        tested,
        metrics.len(),
        significant
    );
    println!("   Duration: {:.1}s", duration);
    println!(
        "\n✅ Comparison complete! Report saved to: {}",
        output_path.display()
    );

    Ok(0)
}

/// Handle --dry-run: print the loaded dataset shapes, no analysis.
fn handle_dry_run(loaded: &[(String, DataFrame)]) -> Result<i32> {
    println!("\n🔍 Dry run: loaded datasets (no analysis)...\n");

    for (site, df) in loaded {
        println!(
            "   📄 {} - {} rows x {} columns [{}]",
            site,
            df.n_rows(),
            df.n_cols(),
            df.column_names().join(", ")
        );
    }
    println!("\n   Total: {} site dataset(s)", loaded.len());

    println!("\n✅ Dry run complete. No analysis was performed.");
    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .solcompare.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
