//! Tabular data model for the comparison toolkit.
//!
//! This module contains the core table representation used throughout
//! the application: a small, column-oriented frame with explicit
//! missing-value markers, plus the `Table` trait that the analysis
//! layer is written against.

use serde::Serialize;
use thiserror::Error;

/// Errors describing a structurally malformed frame.
#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    /// A column's length disagrees with the rest of the frame.
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// A column with this name already exists in the frame.
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
}

/// A single named column of data.
///
/// Missing cells are explicit `None` values - never zero and never an
/// empty string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Column {
    /// Numeric measurements (irradiance, temperature, wind speed, ...).
    Float(Vec<Option<f64>>),
    /// Textual data (timestamps, site labels, comments, ...).
    Text(Vec<Option<String>>),
}

impl Column {
    /// Number of cells in the column (including missing ones).
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    /// Returns true if the column holds no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric view of the column, if it is numeric.
    pub fn as_float(&self) -> Option<&[Option<f64>]> {
        match self {
            Column::Float(v) => Some(v),
            Column::Text(_) => None,
        }
    }

    /// Textual view of the column, if it is textual.
    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match self {
            Column::Text(v) => Some(v),
            Column::Float(_) => None,
        }
    }

    /// Renders every cell as an optional string, regardless of kind.
    ///
    /// Used for grouping, where the group key may be a site label or a
    /// numeric code.
    pub fn render(&self) -> Vec<Option<String>> {
        match self {
            Column::Text(v) => v.clone(),
            Column::Float(v) => v.iter().map(|c| c.map(|x| x.to_string())).collect(),
        }
    }

    /// A column of `n` missing cells matching this column's kind.
    pub fn missing_like(&self, n: usize) -> Column {
        match self {
            Column::Float(_) => Column::Float(vec![None; n]),
            Column::Text(_) => Column::Text(vec![None; n]),
        }
    }

    /// Appends the contents of `other` to this column.
    ///
    /// If the kinds disagree, both sides are promoted to text so that no
    /// value is silently discarded.
    pub fn extend_from(&mut self, other: &Column) {
        match (&mut *self, other) {
            (Column::Float(a), Column::Float(b)) => a.extend_from_slice(b),
            (Column::Text(a), Column::Text(b)) => a.extend_from_slice(b),
            _ => {
                let mut merged = self.render();
                merged.extend(other.render());
                *self = Column::Text(merged);
            }
        }
    }

    /// Appends `n` missing cells.
    pub fn extend_missing(&mut self, n: usize) {
        match self {
            Column::Float(v) => v.extend(std::iter::repeat(None).take(n)),
            Column::Text(v) => v.extend(std::iter::repeat_with(|| None).take(n)),
        }
    }
}

/// A rectangular table of named columns.
///
/// Column order is preserved as columns are added. Analysis code treats
/// frames as read-only: every operation that derives data returns a
/// fresh frame and leaves its inputs untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataFrame {
    columns: Vec<(String, Column)>,
}

impl DataFrame {
    /// Creates an empty frame with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows (length of the first column; 0 if no columns).
    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|(_, c)| c.len()).unwrap_or(0)
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the frame holds no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    /// Adds a column to the frame.
    ///
    /// The new column must match the frame's row count, and its name
    /// must be unique within the frame.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Result<(), FrameError> {
        let name = name.into();
        if self.columns.iter().any(|(n, _)| *n == name) {
            return Err(FrameError::DuplicateColumn(name));
        }
        if !self.columns.is_empty() && column.len() != self.n_rows() {
            return Err(FrameError::RaggedColumn {
                column: name,
                expected: self.n_rows(),
                actual: column.len(),
            });
        }
        self.columns.push((name, column));
        Ok(())
    }

    /// Iterates over `(name, column)` pairs in insertion order.
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(n, c)| (n.as_str(), c))
    }
}

/// Structural contract for "table-shaped" inputs.
///
/// Anything with named columns, a row count, and per-column access can
/// feed the analysis layer; `DataFrame` is the canonical implementor.
/// `column` hands out a materialized copy, so implementations backed by
/// shared storage stay untouched by downstream operations.
pub trait Table {
    /// Number of rows.
    fn n_rows(&self) -> usize;

    /// Column names in table order.
    fn column_names(&self) -> Vec<&str>;

    /// A materialized copy of the named column, if present.
    fn column(&self, name: &str) -> Option<Column>;

    /// Checks the table's internal structure (e.g. rectangularity).
    fn validate(&self) -> Result<(), FrameError>;

    /// Returns true if the named column exists.
    fn has_column(&self, name: &str) -> bool {
        self.column_names().iter().any(|c| *c == name)
    }

    /// Numeric values of the named column, or `None` if the column is
    /// absent or non-numeric.
    fn numeric(&self, name: &str) -> Option<Vec<Option<f64>>> {
        match self.column(name)? {
            Column::Float(v) => Some(v),
            Column::Text(_) => None,
        }
    }

    /// The named column rendered as group keys.
    fn group_keys(&self, name: &str) -> Option<Vec<Option<String>>> {
        Some(self.column(name)?.render())
    }
}

impl Table for DataFrame {
    fn n_rows(&self) -> usize {
        DataFrame::n_rows(self)
    }

    fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    fn column(&self, name: &str) -> Option<Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.clone())
    }

    fn validate(&self) -> Result<(), FrameError> {
        let expected = self.n_rows();
        for (name, column) in &self.columns {
            if column.len() != expected {
                return Err(FrameError::RaggedColumn {
                    column: name.clone(),
                    expected,
                    actual: column.len(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> DataFrame {
        let mut df = DataFrame::new();
        df.push_column("GHI", Column::Float(vec![Some(450.0), Some(460.0), None]))
            .unwrap();
        df.push_column(
            "Timestamp",
            Column::Text(vec![
                Some("2023-01-01".to_string()),
                Some("2023-01-02".to_string()),
                Some("2023-01-03".to_string()),
            ]),
        )
        .unwrap();
        df
    }

    #[test]
    fn test_frame_shape() {
        let df = sample_frame();
        assert_eq!(df.n_rows(), 3);
        assert_eq!(df.n_cols(), 2);
        assert!(!df.is_empty());
        assert_eq!(df.column_names(), vec!["GHI", "Timestamp"]);
    }

    #[test]
    fn test_push_column_rejects_ragged() {
        let mut df = sample_frame();
        let err = df
            .push_column("DNI", Column::Float(vec![Some(1.0)]))
            .unwrap_err();
        assert_eq!(
            err,
            FrameError::RaggedColumn {
                column: "DNI".to_string(),
                expected: 3,
                actual: 1,
            }
        );
    }

    #[test]
    fn test_push_column_rejects_duplicate() {
        let mut df = sample_frame();
        let err = df
            .push_column("GHI", Column::Float(vec![None, None, None]))
            .unwrap_err();
        assert_eq!(err, FrameError::DuplicateColumn("GHI".to_string()));
    }

    #[test]
    fn test_numeric_view() {
        let df = sample_frame();
        let ghi = df.numeric("GHI").unwrap();
        assert_eq!(ghi, vec![Some(450.0), Some(460.0), None]);
        assert!(df.numeric("Timestamp").is_none());
        assert!(df.numeric("missing").is_none());
    }

    #[test]
    fn test_group_keys_renders_any_kind() {
        let df = sample_frame();
        let keys = df.group_keys("GHI").unwrap();
        assert_eq!(keys[0].as_deref(), Some("450"));
        assert_eq!(keys[2], None);

        let ts = df.group_keys("Timestamp").unwrap();
        assert_eq!(ts[0].as_deref(), Some("2023-01-01"));
    }

    #[test]
    fn test_extend_from_mixed_kinds_promotes_to_text() {
        let mut col = Column::Float(vec![Some(1.5), None]);
        col.extend_from(&Column::Text(vec![Some("x".to_string())]));
        match col {
            Column::Text(v) => {
                assert_eq!(v[0].as_deref(), Some("1.5"));
                assert_eq!(v[1], None);
                assert_eq!(v[2].as_deref(), Some("x"));
            }
            Column::Float(_) => panic!("expected promotion to text"),
        }
    }

    #[test]
    fn test_missing_like_and_extend_missing() {
        let col = Column::Float(vec![Some(1.0)]);
        let missing = col.missing_like(2);
        assert_eq!(missing, Column::Float(vec![None, None]));

        let mut text = Column::Text(vec![Some("a".to_string())]);
        text.extend_missing(2);
        assert_eq!(text.len(), 3);
    }
}
