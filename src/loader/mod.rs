//! CSV loading - the row-source boundary.
//!
//! Loading never propagates an error past this module: a missing or
//! unreadable file is logged and reported as `None`, and the caller
//! filters absences before any analysis happens. Column types are
//! inferred per column: numeric if every non-empty cell parses as a
//! float, textual otherwise (timestamps stay textual).

use crate::frame::{Column, DataFrame};
use std::path::Path;
use tracing::{error, info};

/// Cell spellings treated as missing values.
const MISSING_MARKERS: [&str; 5] = ["", "na", "nan", "n/a", "null"];

/// Loads a CSV file into a frame.
///
/// Returns `None` (after logging the reason) if the file does not
/// exist, cannot be parsed, or has a malformed header. Never panics.
pub fn load_csv(path: &Path) -> Option<DataFrame> {
    if !path.exists() {
        error!("File does not exist: {}", path.display());
        return None;
    }

    match read_csv(path) {
        Ok(df) => {
            info!(
                "Successfully loaded data from {} with shape ({}, {})",
                path.display(),
                df.n_rows(),
                df.n_cols()
            );
            Some(df)
        }
        Err(e) => {
            error!("Failed to load data from {}: {}", path.display(), e);
            None
        }
    }
}

/// Loads every site in the given `(name, path)` pairs, filtering out
/// the ones whose file could not be loaded.
///
/// The supplied order is preserved, which keeps the downstream
/// concatenation order deterministic.
pub fn load_sites(pairs: &[(String, std::path::PathBuf)]) -> Vec<(String, DataFrame)> {
    let loaded: Vec<(String, DataFrame)> = pairs
        .iter()
        .filter_map(|(site, path)| load_csv(path).map(|df| (site.clone(), df)))
        .collect();
    info!("Loaded {} of {} site dataset(s).", loaded.len(), pairs.len());
    loaded
}

fn read_csv(path: &Path) -> anyhow::Result<DataFrame> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (col, cell) in cells.iter_mut().enumerate() {
            let raw = record.get(col).unwrap_or("").trim();
            if MISSING_MARKERS.contains(&raw.to_lowercase().as_str()) {
                cell.push(None);
            } else {
                cell.push(Some(raw.to_string()));
            }
        }
    }

    let mut df = DataFrame::new();
    for (name, raw) in headers.into_iter().zip(cells) {
        df.push_column(name, infer_column(raw))?;
    }
    Ok(df)
}

/// Numeric if every present cell parses as f64, textual otherwise.
fn infer_column(raw: Vec<Option<String>>) -> Column {
    let parsed: Option<Vec<Option<f64>>> = raw
        .iter()
        .map(|cell| match cell {
            None => Some(None),
            Some(s) => s.parse::<f64>().ok().map(Some),
        })
        .collect();

    match parsed {
        Some(floats) if raw.iter().any(|c| c.is_some()) => Column::Float(floats),
        _ => Column::Text(raw),
    }
}
