//! Markdown and JSON report generation.
//!
//! Renders the comparison results - per-site row counts, the grouped
//! summary table, and one ANOVA section per metric - into a report.
//! Sections whose analysis returned an absence signal are skipped with
//! a note rather than failing the whole report.

use crate::analysis::{AnovaResult, DEFAULT_ALPHA};
use crate::frame::{DataFrame, Table};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata about the comparison run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Names of the sites that contributed data.
    pub sites: Vec<String>,
    /// Date and time of the analysis.
    pub analysis_date: DateTime<Utc>,
    /// Column used to group rows by site.
    pub group_col: String,
    /// Total rows in the unified dataset.
    pub total_rows: usize,
    /// Duration of the analysis in seconds.
    pub duration_seconds: f64,
}

/// The ANOVA outcome for one metric column.
#[derive(Debug, Clone, Serialize)]
pub struct MetricComparison {
    /// Metric column name.
    pub metric: String,
    /// Test result, absent if the test could not be computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anova: Option<AnovaResult>,
    /// Why the test was skipped, when it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

/// The complete comparison report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Metadata about the run.
    pub metadata: ReportMetadata,
    /// Row count contributed by each site, in input order.
    pub site_rows: Vec<(String, usize)>,
    /// The grouped summary table, absent if summarization was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<DataFrame>,
    /// Why the summary was skipped, when it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_skipped: Option<String>,
    /// One ANOVA comparison per tested metric.
    pub comparisons: Vec<MetricComparison>,
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# SolCompare Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_sites_section(&report.site_rows));
    output.push_str(&generate_summary_section(report));
    output.push_str(&generate_anova_section(&report.comparisons));
    output.push_str(&generate_footer());

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Sites:** {}\n", metadata.sites.join(", ")));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Group Column:** `{}`\n", metadata.group_col));
    section.push_str(&format!("- **Total Rows:** {}\n", metadata.total_rows));
    section.push_str(&format!(
        "- **Analysis Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the per-site row count table.
fn generate_sites_section(site_rows: &[(String, usize)]) -> String {
    let mut section = String::new();

    section.push_str("## Sites\n\n");
    section.push_str("| Site | Rows |\n");
    section.push_str("|------|------|\n");
    for (site, rows) in site_rows {
        section.push_str(&format!("| {} | {} |\n", site, rows));
    }
    section.push('\n');

    section
}

/// Generate the grouped summary statistics section.
fn generate_summary_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("## Summary Statistics\n\n");
    match (&report.summary, &report.summary_skipped) {
        (Some(summary), _) => section.push_str(&render_table(summary)),
        (None, Some(reason)) => {
            section.push_str(&format!("_Summary skipped: {}_\n", reason));
        }
        (None, None) => section.push_str("_No summary was computed._\n"),
    }
    section.push('\n');

    section
}

/// Generate the significance test section.
fn generate_anova_section(comparisons: &[MetricComparison]) -> String {
    if comparisons.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Significance Tests (one-way ANOVA)\n\n");

    for comparison in comparisons {
        section.push_str(&format!("### {}\n\n", comparison.metric));
        match (&comparison.anova, &comparison.skipped) {
            (Some(result), _) => {
                let verdict = if result.is_significant() {
                    format!("significant (p < {})", DEFAULT_ALPHA)
                } else {
                    "not significant".to_string()
                };
                section.push_str(&format!(
                    "- **F statistic:** {:.6}\n- **p-value:** {:.6}\n- **Groups:** {}\n- **Verdict:** {}\n",
                    result.f_statistic, result.p_value, result.groups, verdict
                ));
            }
            (None, Some(reason)) => {
                section.push_str(&format!("_Test skipped: {}_\n", reason));
            }
            (None, None) => section.push_str("_Test not computed._\n"),
        }
        section.push('\n');
    }

    section
}

/// Render a frame as a Markdown table, with missing cells shown as NA.
fn render_table(df: &DataFrame) -> String {
    let mut table = String::new();
    let names = df.column_names();

    table.push_str(&format!("| {} |\n", names.join(" | ")));
    table.push_str(&format!(
        "|{}\n",
        names.iter().map(|_| "------|").collect::<String>()
    ));

    let rendered: Vec<Vec<Option<String>>> =
        df.iter_columns().map(|(_, col)| col.render()).collect();
    for row in 0..df.n_rows() {
        let cells: Vec<String> = rendered
            .iter()
            .map(|col| col[row].clone().unwrap_or_else(|| "NA".to_string()))
            .collect();
        table.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    table
}

/// Generate the report footer.
fn generate_footer() -> String {
    format!(
        "---\n\n_Generated by SolCompare v{}_\n",
        env!("CARGO_PKG_VERSION")
    )
}
