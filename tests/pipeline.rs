//! End-to-end pipeline test: load CSVs, combine, summarize, compare.

use solcompare::analysis::{self, AnovaError, Stat};
use solcompare::frame::Table;
use solcompare::loader;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_full_pipeline() {
    let dir = TempDir::new().unwrap();
    let benin = write_csv(
        &dir,
        "benin.csv",
        "Timestamp,GHI,DNI\n\
         2023-01-01 10:00,450.0,300.0\n\
         2023-01-01 11:00,460.0,310.0\n\
         2023-01-01 12:00,455.0,305.0\n",
    );
    let togo = write_csv(
        &dir,
        "togo.csv",
        "Timestamp,GHI,DNI\n\
         2023-01-01 10:00,300.0,200.0\n\
         2023-01-01 11:00,310.0,210.0\n\
         2023-01-01 12:00,305.0,205.0\n",
    );

    let pairs = vec![
        ("Benin".to_string(), benin),
        ("Ghost".to_string(), dir.path().join("missing.csv")),
        ("Togo".to_string(), togo),
    ];

    // The missing file is filtered out, not fatal.
    let loaded = loader::load_sites(&pairs);
    assert_eq!(loaded.len(), 2);

    let unified = analysis::combine(&loaded).unwrap();
    assert_eq!(unified.n_rows(), 6);
    let sites = unified.group_keys("site").unwrap();
    assert_eq!(sites[0].as_deref(), Some("Benin"));
    assert_eq!(sites[5].as_deref(), Some("Togo"));

    // Round-trip property: summarize(combine(sites)) column names follow
    // the {metric}_{stat} convention, with no extras and no omissions.
    let metrics = vec!["GHI".to_string(), "DNI".to_string()];
    let summary = analysis::summarize(&unified, &metrics, &Stat::defaults(), "site").unwrap();
    assert_eq!(
        summary.column_names(),
        vec![
            "site",
            "GHI_mean",
            "GHI_median",
            "GHI_std",
            "DNI_mean",
            "DNI_median",
            "DNI_std",
        ]
    );
    assert_eq!(summary.n_rows(), 2);
    assert_eq!(summary.numeric("GHI_mean").unwrap()[0], Some(455.0));
    assert_eq!(summary.numeric("GHI_median").unwrap()[1], Some(305.0));

    // Clearly separated groups: the difference is significant.
    let result = analysis::compare(&unified, "site", "GHI", false).unwrap();
    assert_eq!(result.groups, 2);
    assert!(result.p_value < 0.05);

    // A metric absent from every site is an absence signal, not a panic.
    assert_eq!(
        analysis::compare(&unified, "site", "DHI", false),
        Err(AnovaError::MissingColumn("DHI".to_string()))
    );
}

#[test]
fn test_pipeline_with_heterogeneous_columns() {
    let dir = TempDir::new().unwrap();
    let a = write_csv(&dir, "a.csv", "GHI,Tamb\n500.0,28.0\n510.0,29.0\n");
    let b = write_csv(&dir, "b.csv", "GHI\n400.0\n410.0\n");

    let pairs = vec![("A".to_string(), a), ("B".to_string(), b)];
    let loaded = loader::load_sites(&pairs);
    let unified = analysis::combine(&loaded).unwrap();

    // Column union is preserved; site B's rows carry missing Tamb.
    assert_eq!(
        unified.numeric("Tamb").unwrap(),
        vec![Some(28.0), Some(29.0), None, None]
    );

    // Summarizing over the sparse metric still works per group.
    let summary = analysis::summarize(
        &unified,
        &["Tamb".to_string()],
        &[Stat::Mean],
        "site",
    )
    .unwrap();
    let means = summary.numeric("Tamb_mean").unwrap();
    assert_eq!(means[0], Some(28.5));
    assert_eq!(means[1], None);
}
