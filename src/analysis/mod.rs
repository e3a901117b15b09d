//! The statistical comparison core.
//!
//! Combines per-site tables into one unified dataset, summarizes it per
//! group, and tests for across-group differences.

pub mod anova;
pub mod combiner;
pub mod distribution;
pub mod summary;

pub use anova::{compare, AnovaError, AnovaResult, DEFAULT_ALPHA};
pub use combiner::{combine, CombineError, SITE_COLUMN};
pub use summary::{summarize, ParseStatError, Stat, SummaryError, DEFAULT_METRICS};
