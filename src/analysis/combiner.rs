//! Combining per-site tables into one unified dataset.
//!
//! This module merges the tables loaded for each measurement site into
//! a single frame tagged with a `site` column, validating every input
//! up front. A single bad entry fails the whole operation - callers
//! never receive a partially merged dataset.

use crate::frame::{Column, DataFrame, FrameError, Table};
use thiserror::Error;
use tracing::{debug, error, info};

/// Name of the provenance column attached to every combined row.
pub const SITE_COLUMN: &str = "site";

/// Errors raised while combining site tables.
///
/// All of these indicate a caller problem (bad identifiers, malformed
/// or empty inputs) and abort the combine call outright.
#[derive(Debug, Error)]
pub enum CombineError {
    /// The site mapping was empty.
    #[error("no site tables were provided")]
    NoInput,

    /// A site key was empty or blank.
    #[error("site name must be a non-empty string")]
    InvalidSiteName,

    /// A value was not a structurally valid table.
    #[error("table for '{site}' is not a valid table: {source}")]
    InvalidTable {
        site: String,
        #[source]
        source: FrameError,
    },

    /// A site's table had no rows.
    #[error("table for '{site}' is empty")]
    EmptyTable { site: String },
}

/// Combines multiple site tables into a single frame, adding a `site`
/// column identifying the origin of each row.
///
/// Inputs are given as ordered `(site, table)` pairs; concatenation
/// preserves both the pair order and the row order within each table,
/// and rows are reindexed sequentially in the output. Columns are
/// aligned by name across sites: a column absent from some site's table
/// is filled with missing values for that site's rows. Input tables are
/// never mutated - the unified frame is built from copies.
///
/// Any precondition violation aborts the entire call with a
/// [`CombineError`] identifying the offending site.
pub fn combine<T: Table>(site_tables: &[(String, T)]) -> Result<DataFrame, CombineError> {
    if site_tables.is_empty() {
        error!("No site tables were provided.");
        return Err(CombineError::NoInput);
    }

    // Validate every entry before touching any data.
    for (site, table) in site_tables {
        if site.trim().is_empty() {
            error!("Site name must be a non-empty string.");
            return Err(CombineError::InvalidSiteName);
        }
        if let Err(source) = table.validate() {
            error!("Table for '{}' is not a valid table: {}", site, source);
            return Err(CombineError::InvalidTable {
                site: site.clone(),
                source,
            });
        }
        if table.n_rows() == 0 {
            error!("Table for '{}' is empty.", site);
            return Err(CombineError::EmptyTable { site: site.clone() });
        }
    }
    debug!("All {} site tables are valid.", site_tables.len());

    // Column union in first-seen order. An input column that collides
    // with the provenance column is dropped in favor of the tag.
    let mut union: Vec<String> = Vec::new();
    for (_, table) in site_tables {
        for name in table.column_names() {
            if name != SITE_COLUMN && !union.iter().any(|u| u == name) {
                union.push(name.to_string());
            }
        }
    }

    let total_rows: usize = site_tables.iter().map(|(_, t)| t.n_rows()).sum();

    let mut combined = DataFrame::new();
    for name in &union {
        let mut acc: Option<Column> = None;
        for (_, table) in site_tables {
            let rows = table.n_rows();
            let part = table.column(name);
            if let Some(col) = acc.as_mut() {
                match part {
                    Some(part) => col.extend_from(&part),
                    None => col.extend_missing(rows),
                }
            } else {
                acc = Some(part.unwrap_or_else(|| Column::Float(vec![None; rows])));
            }
        }
        let column = acc.unwrap_or(Column::Float(Vec::new()));
        combined
            .push_column(name.clone(), column)
            .expect("union columns are unique and length-aligned");
    }

    let mut site_tags: Vec<Option<String>> = Vec::with_capacity(total_rows);
    for (site, table) in site_tables {
        site_tags.extend(std::iter::repeat_with(|| Some(site.clone())).take(table.n_rows()));
    }
    combined
        .push_column(SITE_COLUMN, Column::Text(site_tags))
        .expect("site column is length-aligned");

    info!(
        "Combined {} rows from {} sites into one dataset.",
        total_rows,
        site_tables.len()
    );
    Ok(combined)
}
