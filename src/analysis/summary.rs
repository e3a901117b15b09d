//! Grouped descriptive statistics over the unified dataset.
//!
//! Produces one row per site with a `{metric}_{stat}` column for every
//! requested (metric, statistic) pair. Validation failures here mean
//! "this run has incomplete data" rather than a programming error, so
//! they are logged and surfaced as typed absence signals instead of
//! panics - the report layer can skip a section and keep going.

use crate::frame::{Column, DataFrame, Table};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

/// Metric columns summarized when the caller does not specify any.
pub const DEFAULT_METRICS: [&str; 3] = ["GHI", "DNI", "DHI"];

/// A descriptive statistic the aggregator knows how to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    /// Arithmetic mean.
    Mean,
    /// 50th percentile (midpoint of the two central values for even n).
    Median,
    /// Sample standard deviation (n-1 denominator).
    Std,
}

impl Stat {
    /// The statistics computed when the caller does not specify any.
    pub fn defaults() -> Vec<Stat> {
        vec![Stat::Mean, Stat::Median, Stat::Std]
    }

    /// Computes this statistic over the given non-missing values.
    ///
    /// Returns `None` when the statistic is undefined for the sample
    /// (no values at all, or a single value for the sample std).
    pub fn compute(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        match self {
            Stat::Mean => Some(values.iter().sum::<f64>() / n),
            Stat::Median => {
                let mut sorted = values.to_vec();
                sorted.sort_by(|a, b| a.total_cmp(b));
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 0 {
                    Some((sorted[mid - 1] + sorted[mid]) / 2.0)
                } else {
                    Some(sorted[mid])
                }
            }
            Stat::Std => {
                if values.len() < 2 {
                    return None;
                }
                let mean = values.iter().sum::<f64>() / n;
                let variance =
                    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
                Some(variance.sqrt())
            }
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stat::Mean => write!(f, "mean"),
            Stat::Median => write!(f, "median"),
            Stat::Std => write!(f, "std"),
        }
    }
}

/// Error for a statistic name the aggregator does not recognize.
///
/// This is a caller error and propagates; it is never absorbed into an
/// absence signal.
#[derive(Debug, Error, PartialEq)]
#[error("unrecognized statistic '{0}' (expected mean, median, or std)")]
pub struct ParseStatError(pub String);

impl FromStr for Stat {
    type Err = ParseStatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mean" => Ok(Stat::Mean),
            "median" => Ok(Stat::Median),
            "std" => Ok(Stat::Std),
            other => Err(ParseStatError(other.to_string())),
        }
    }
}

/// Recoverable aggregation failures, surfaced as absence signals.
#[derive(Debug, Error, PartialEq)]
pub enum SummaryError {
    /// The input table has no rows.
    #[error("cannot summarize an empty table")]
    EmptyTable,

    /// The grouping column is absent.
    #[error("group column '{0}' not found in the table")]
    MissingGroupColumn(String),

    /// One or more requested metric columns are absent. No partial
    /// aggregation is performed over the present ones.
    #[error("metric column(s) missing from the table: {}", .0.join(", "))]
    MissingMetrics(Vec<String>),
}

/// Computes grouped descriptive statistics for the requested metrics.
///
/// Groups rows by `group_col`, computes each statistic in `stats` over
/// the non-missing values of each metric, rounds to 2 decimal places,
/// and flattens the results into `{metric}_{stat}` columns. The output
/// has one row per group with the group key as an ordinary first
/// column, and groups are ordered ascending by key value regardless of
/// input row order.
///
/// A group whose values are all missing for a metric yields a missing
/// statistic, never zero. Rows with a missing group key belong to no
/// group and are skipped.
pub fn summarize<T: Table>(
    table: &T,
    metrics: &[String],
    stats: &[Stat],
    group_col: &str,
) -> Result<DataFrame, SummaryError> {
    if table.n_rows() == 0 {
        warn!("Cannot summarize an empty table.");
        return Err(SummaryError::EmptyTable);
    }
    if !table.has_column(group_col) {
        warn!("Group column '{}' not found in the table.", group_col);
        return Err(SummaryError::MissingGroupColumn(group_col.to_string()));
    }

    let missing: Vec<String> = metrics
        .iter()
        .filter(|m| !table.has_column(m))
        .cloned()
        .collect();
    if !missing.is_empty() {
        warn!(
            "Metric column(s) missing from the table: {}",
            missing.join(", ")
        );
        return Err(SummaryError::MissingMetrics(missing));
    }

    // Partition row indices by group key, ascending by key value.
    let keys = table
        .group_keys(group_col)
        .expect("group column presence was checked above");
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (row, key) in keys.iter().enumerate() {
        if let Some(key) = key {
            groups.entry(key.clone()).or_default().push(row);
        }
    }

    let mut summary = DataFrame::new();
    summary
        .push_column(
            group_col,
            Column::Text(groups.keys().map(|k| Some(k.clone())).collect()),
        )
        .expect("first column of a fresh frame");

    for metric in metrics {
        // A metric column that exists but is non-numeric contributes no
        // values, same as an all-missing column.
        let values = table
            .numeric(metric)
            .unwrap_or_else(|| vec![None; table.n_rows()]);

        for stat in stats {
            let mut cells: Vec<Option<f64>> = Vec::with_capacity(groups.len());
            for rows in groups.values() {
                let sample: Vec<f64> =
                    rows.iter().filter_map(|&r| values.get(r).copied().flatten()).collect();
                cells.push(stat.compute(&sample).map(round2));
            }
            summary
                .push_column(format!("{}_{}", metric, stat), Column::Float(cells))
                .expect("summary columns are unique and length-aligned");
        }
    }

    info!(
        "Summarized {} metric(s) across {} group(s).",
        metrics.len(),
        groups.len()
    );
    Ok(summary)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_group_table() -> DataFrame {
        let mut df = DataFrame::new();
        df.push_column(
            "site",
            Column::Text(vec![
                Some("Benin".to_string()),
                Some("Benin".to_string()),
                Some("Togo".to_string()),
                Some("Togo".to_string()),
            ]),
        )
        .unwrap();
        df.push_column(
            "GHI",
            Column::Float(vec![Some(450.0), Some(460.0), Some(400.0), Some(410.0)]),
        )
        .unwrap();
        df
    }

    fn metrics(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_summarize_known_values() {
        let df = two_group_table();
        let summary =
            summarize(&df, &metrics(&["GHI"]), &Stat::defaults(), "site").unwrap();

        assert_eq!(summary.n_rows(), 2);
        let mean = summary.numeric("GHI_mean").unwrap();
        let median = summary.numeric("GHI_median").unwrap();
        let std = summary.numeric("GHI_std").unwrap();

        // Benin: [450, 460] -> mean 455.0, median 455.0, sample std 7.07
        assert_eq!(mean[0], Some(455.0));
        assert_eq!(median[0], Some(455.0));
        assert_eq!(std[0], Some(7.07));

        // Togo: [400, 410]
        assert_eq!(mean[1], Some(405.0));
        assert_eq!(std[1], Some(7.07));
    }

    #[test]
    fn test_summarize_column_naming_convention() {
        let df = two_group_table();
        let summary =
            summarize(&df, &metrics(&["GHI"]), &Stat::defaults(), "site").unwrap();
        assert_eq!(
            summary.column_names(),
            vec!["site", "GHI_mean", "GHI_median", "GHI_std"]
        );
    }

    #[test]
    fn test_summarize_groups_sorted_ascending() {
        let mut df = DataFrame::new();
        df.push_column(
            "site",
            Column::Text(vec![
                Some("Togo".to_string()),
                Some("Benin".to_string()),
                Some("Togo".to_string()),
            ]),
        )
        .unwrap();
        df.push_column("GHI", Column::Float(vec![Some(1.0), Some(2.0), Some(3.0)]))
            .unwrap();

        let summary = summarize(&df, &metrics(&["GHI"]), &[Stat::Mean], "site").unwrap();
        let keys = summary.group_keys("site").unwrap();
        let names: Vec<_> = keys.iter().map(|k| k.as_deref().unwrap()).collect();
        assert_eq!(names, vec!["Benin", "Togo"]);
    }

    #[test]
    fn test_summarize_missing_metric_is_all_or_nothing() {
        let df = two_group_table();
        let err = summarize(
            &df,
            &metrics(&["GHI", "DNI", "DHI"]),
            &[Stat::Mean],
            "site",
        )
        .unwrap_err();

        match err {
            SummaryError::MissingMetrics(names) => {
                assert_eq!(names, vec!["DNI".to_string(), "DHI".to_string()]);
            }
            other => panic!("expected MissingMetrics, got {:?}", other),
        }
    }

    #[test]
    fn test_summarize_empty_table() {
        let df = DataFrame::new();
        assert_eq!(
            summarize(&df, &metrics(&["GHI"]), &[Stat::Mean], "site"),
            Err(SummaryError::EmptyTable)
        );
    }

    #[test]
    fn test_summarize_missing_group_column() {
        let mut df = DataFrame::new();
        df.push_column("GHI", Column::Float(vec![Some(1.0)])).unwrap();
        assert_eq!(
            summarize(&df, &metrics(&["GHI"]), &[Stat::Mean], "site"),
            Err(SummaryError::MissingGroupColumn("site".to_string()))
        );
    }

    #[test]
    fn test_summarize_skips_missing_values() {
        let mut df = DataFrame::new();
        df.push_column(
            "site",
            Column::Text(vec![
                Some("A".to_string()),
                Some("A".to_string()),
                Some("A".to_string()),
            ]),
        )
        .unwrap();
        df.push_column("GHI", Column::Float(vec![Some(10.0), None, Some(20.0)]))
            .unwrap();

        let summary = summarize(&df, &metrics(&["GHI"]), &[Stat::Mean], "site").unwrap();
        assert_eq!(summary.numeric("GHI_mean").unwrap()[0], Some(15.0));
    }

    #[test]
    fn test_summarize_all_missing_group_yields_missing_stat() {
        let mut df = DataFrame::new();
        df.push_column(
            "site",
            Column::Text(vec![Some("A".to_string()), Some("B".to_string())]),
        )
        .unwrap();
        df.push_column("GHI", Column::Float(vec![None, Some(5.0)]))
            .unwrap();

        let summary = summarize(&df, &metrics(&["GHI"]), &[Stat::Mean], "site").unwrap();
        let mean = summary.numeric("GHI_mean").unwrap();
        assert_eq!(mean[0], None);
        assert_eq!(mean[1], Some(5.0));
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(Stat::Median.compute(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(Stat::Median.compute(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
    }

    #[test]
    fn test_std_single_value_undefined() {
        assert_eq!(Stat::Std.compute(&[5.0]), None);
    }

    #[test]
    fn test_stat_parsing() {
        assert_eq!("mean".parse::<Stat>(), Ok(Stat::Mean));
        assert_eq!("Median".parse::<Stat>(), Ok(Stat::Median));
        assert_eq!(" std ".parse::<Stat>(), Ok(Stat::Std));
        assert!("variance".parse::<Stat>().is_err());
    }
}
