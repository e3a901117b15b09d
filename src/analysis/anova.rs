//! One-way ANOVA across site groups.
//!
//! Answers "do these sites differ in mean irradiance more than chance
//! would explain?" by partitioning a value column by group and running
//! an F-test over the partitions. Failures here are absence signals:
//! they are logged and returned as typed errors, never panics, so a
//! report can simply omit the section.

use crate::analysis::distribution::f_survival;
use crate::frame::Table;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, warn};

/// Significance threshold used by [`AnovaResult::is_significant`] and
/// the `interpret` side message.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Result of a one-way ANOVA F-test.
///
/// Both values are full IEEE double precision; no rounding is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnovaResult {
    /// The F statistic (between-group over within-group variance).
    pub f_statistic: f64,
    /// Probability of an F at least this large under the null.
    pub p_value: f64,
    /// Number of non-empty groups that entered the test.
    pub groups: usize,
}

impl AnovaResult {
    /// Whether the p-value falls below [`DEFAULT_ALPHA`].
    pub fn is_significant(&self) -> bool {
        self.p_value < DEFAULT_ALPHA
    }
}

/// Reasons the test could not be computed.
///
/// These describe incomplete or degenerate data for this particular
/// run; callers degrade gracefully rather than abort.
#[derive(Debug, Error, PartialEq)]
pub enum AnovaError {
    /// The group or value column is absent from the table.
    #[error("column '{0}' not found in the table")]
    MissingColumn(String),

    /// The value column is not numeric.
    #[error("column '{0}' is not numeric")]
    NonNumericColumn(String),

    /// Fewer than two groups had any non-missing values.
    #[error("one-way ANOVA requires at least 2 non-empty groups, found {found}")]
    NotEnoughGroups { found: usize },

    /// The test is numerically undefined for this data.
    #[error("degenerate data for ANOVA: {0}")]
    DegenerateData(String),
}

/// Runs a one-way ANOVA of `value_col` across the groups of
/// `group_col`.
///
/// Missing values are dropped within each partition and partitions left
/// empty are discarded before the test. When `interpret` is set, the
/// result is additionally classified against [`DEFAULT_ALPHA`] and the
/// classification is logged; the return value is unchanged.
pub fn compare<T: Table>(
    table: &T,
    group_col: &str,
    value_col: &str,
    interpret: bool,
) -> Result<AnovaResult, AnovaError> {
    let keys = table.group_keys(group_col).ok_or_else(|| {
        warn!("Column '{}' not found in the table.", group_col);
        AnovaError::MissingColumn(group_col.to_string())
    })?;
    if !table.has_column(value_col) {
        warn!("Column '{}' not found in the table.", value_col);
        return Err(AnovaError::MissingColumn(value_col.to_string()));
    }
    let values = table.numeric(value_col).ok_or_else(|| {
        warn!("Column '{}' is not numeric.", value_col);
        AnovaError::NonNumericColumn(value_col.to_string())
    })?;

    // Partition by group, dropping missing values; empty partitions
    // fall out naturally since only rows with values create entries.
    let mut partitions: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (key, value) in keys.iter().zip(values.iter()) {
        if let (Some(key), Some(value)) = (key, value) {
            partitions.entry(key.clone()).or_default().push(*value);
        }
    }

    let k = partitions.len();
    if k < 2 {
        warn!(
            "One-way ANOVA requires at least 2 non-empty groups, found {}.",
            k
        );
        return Err(AnovaError::NotEnoughGroups { found: k });
    }

    let n: usize = partitions.values().map(|v| v.len()).sum();
    let df_between = (k - 1) as f64;
    let df_within = (n - k) as f64;
    if df_within <= 0.0 {
        warn!("No within-group degrees of freedom left for ANOVA.");
        return Err(AnovaError::DegenerateData(
            "no within-group degrees of freedom".to_string(),
        ));
    }

    let grand_mean: f64 = partitions.values().flatten().sum::<f64>() / n as f64;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for sample in partitions.values() {
        let group_mean = sample.iter().sum::<f64>() / sample.len() as f64;
        ss_between += sample.len() as f64 * (group_mean - grand_mean).powi(2);
        ss_within += sample.iter().map(|v| (v - group_mean).powi(2)).sum::<f64>();
    }

    let ms_within = ss_within / df_within;
    if ms_within == 0.0 {
        warn!("Zero within-group variance; the F statistic is undefined.");
        return Err(AnovaError::DegenerateData(
            "zero within-group variance".to_string(),
        ));
    }

    let f_statistic = (ss_between / df_between) / ms_within;
    if !f_statistic.is_finite() {
        warn!("Non-finite F statistic ({}).", f_statistic);
        return Err(AnovaError::DegenerateData(
            "non-finite F statistic".to_string(),
        ));
    }

    let p_value = f_survival(f_statistic, df_between, df_within);
    let result = AnovaResult {
        f_statistic,
        p_value,
        groups: k,
    };

    if interpret {
        if result.is_significant() {
            info!(
                "'{}' differs significantly across '{}' groups (p = {:.4} < {}).",
                value_col, group_col, p_value, DEFAULT_ALPHA
            );
        } else {
            info!(
                "'{}' shows no significant difference across '{}' groups (p = {:.4}).",
                value_col, group_col, p_value
            );
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Column, DataFrame};

    fn table(sites: &[&str], ghi: Vec<Option<f64>>) -> DataFrame {
        let mut df = DataFrame::new();
        df.push_column(
            "site",
            Column::Text(sites.iter().map(|s| Some(s.to_string())).collect()),
        )
        .unwrap();
        df.push_column("GHI", Column::Float(ghi)).unwrap();
        df
    }

    #[test]
    fn test_distinct_groups_are_significant() {
        // Benin [450, 460] vs Togo [400, 410]:
        // SSB = 2500, SSW = 100, df = (1, 2), F = 50, p ~ 0.0194.
        let df = table(
            &["Benin", "Benin", "Togo", "Togo"],
            vec![Some(450.0), Some(460.0), Some(400.0), Some(410.0)],
        );
        let result = compare(&df, "site", "GHI", false).unwrap();

        assert_eq!(result.groups, 2);
        assert!((result.f_statistic - 50.0).abs() < 1e-10);
        assert!((result.p_value - 0.019418).abs() < 1e-4);
        assert!(result.is_significant());
    }

    #[test]
    fn test_identical_groups_not_significant() {
        let df = table(
            &["A", "A", "A", "B", "B", "B"],
            vec![
                Some(1.0),
                Some(2.0),
                Some(3.0),
                Some(1.0),
                Some(2.0),
                Some(3.0),
            ],
        );
        let result = compare(&df, "site", "GHI", false).unwrap();

        assert!(result.f_statistic.abs() < 1e-12);
        assert!((result.p_value - 1.0).abs() < 1e-9);
        assert!(!result.is_significant());
    }

    #[test]
    fn test_single_group_is_absence() {
        let df = table(&["A", "A"], vec![Some(1.0), Some(2.0)]);
        assert_eq!(
            compare(&df, "site", "GHI", false),
            Err(AnovaError::NotEnoughGroups { found: 1 })
        );
    }

    #[test]
    fn test_group_emptied_by_missing_values_is_discarded() {
        let df = table(
            &["A", "A", "B", "B"],
            vec![Some(1.0), Some(2.0), None, None],
        );
        assert_eq!(
            compare(&df, "site", "GHI", false),
            Err(AnovaError::NotEnoughGroups { found: 1 })
        );
    }

    #[test]
    fn test_missing_columns_are_absence() {
        let df = table(&["A", "B"], vec![Some(1.0), Some(2.0)]);
        assert_eq!(
            compare(&df, "country", "GHI", false),
            Err(AnovaError::MissingColumn("country".to_string()))
        );
        assert_eq!(
            compare(&df, "site", "DNI", false),
            Err(AnovaError::MissingColumn("DNI".to_string()))
        );
    }

    #[test]
    fn test_zero_within_variance_is_degenerate() {
        let df = table(
            &["A", "A", "B", "B"],
            vec![Some(5.0), Some(5.0), Some(7.0), Some(7.0)],
        );
        assert!(matches!(
            compare(&df, "site", "GHI", false),
            Err(AnovaError::DegenerateData(_))
        ));
    }

    #[test]
    fn test_no_within_degrees_of_freedom() {
        let df = table(&["A", "B"], vec![Some(1.0), Some(2.0)]);
        assert!(matches!(
            compare(&df, "site", "GHI", false),
            Err(AnovaError::DegenerateData(_))
        ));
    }

    #[test]
    fn test_interpret_does_not_change_result() {
        let df = table(
            &["Benin", "Benin", "Togo", "Togo"],
            vec![Some(450.0), Some(460.0), Some(400.0), Some(410.0)],
        );
        let quiet = compare(&df, "site", "GHI", false).unwrap();
        let chatty = compare(&df, "site", "GHI", true).unwrap();
        assert_eq!(quiet.f_statistic, chatty.f_statistic);
        assert_eq!(quiet.p_value, chatty.p_value);
    }
}
