//! Cross-site solar irradiance comparison toolkit.
//!
//! Loads per-site measurement CSVs, merges them into one site-tagged
//! dataset, computes grouped descriptive statistics, and tests
//! across-site differences with a one-way ANOVA. The binary in
//! `main.rs` wires these pieces into a CLI; everything here is usable
//! as a library.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod frame;
pub mod loader;
pub mod report;
