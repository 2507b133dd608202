// Interval validation through the public API and the command line.
use std::collections::BTreeMap;
use std::process::Command;

use welllog_cache::validate::interval::read_intervals_csv;
use welllog_cache::{
    DepthInterval, InMemoryCodeLookup, IntervalColumns, Severity, Validator, ValidatorConfig,
};

fn cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_welllog-cache"))
}

fn rows(bounds: &[(f64, f64)]) -> Vec<DepthInterval> {
    bounds
        .iter()
        .enumerate()
        .map(|(row, &(from, to))| DepthInterval::new(row, from, to))
        .collect()
}

#[test]
fn gap_is_the_only_issue() {
    let result = welllog_cache::validate_intervals(&rows(&[(25.0, 30.0), (0.0, 10.0), (10.0, 20.0)]), None);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].severity, Severity::Error);
    assert_eq!(result.issues[0].message, "gap of 5.000 between rows 2, 0");
    assert!(!result.is_valid());
}

#[test]
fn total_depth_mismatch_cites_difference() {
    let result = welllog_cache::validate_intervals(&rows(&[(0.0, 10.0), (10.0, 29.5)]), Some(30.0));
    assert_eq!(result.warning_count(), 1);
    assert_eq!(result.error_count(), 0);
    assert_eq!(result.issues[0].value.as_deref(), Some("0.500"));

    let result = welllog_cache::validate_intervals(&rows(&[(0.0, 10.0), (10.0, 29.9995)]), Some(30.0));
    assert!(result.issues.is_empty());
}

#[test]
fn equal_from_depths_keep_input_order() {
    // Rows 0 and 1 tie on from_depth; the stable sort keeps row 0 first,
    // so the overlap is reported against row 1.
    let result = welllog_cache::validate_intervals(&rows(&[(0.0, 5.0), (0.0, 10.0)]), None);
    let overlap = result.errors().next().expect("overlap");
    assert_eq!(overlap.message, "overlap of 5.000 between rows 0, 1");
    assert_eq!(overlap.row, Some(1));
}

#[test]
fn wider_tolerance_accepts_small_gaps() {
    let intervals = rows(&[(0.0, 10.0), (10.05, 20.0)]);
    assert_eq!(welllog_cache::validate_intervals(&intervals, None).error_count(), 1);

    let loose = Validator::new(ValidatorConfig {
        tolerance: 0.1,
        ..ValidatorConfig::default()
    });
    assert!(loose.validate(&intervals, None).is_valid());
}

#[test]
fn csv_table_with_dictionary_codes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("units.csv");
    std::fs::write(&path, "From,To,Thickness,Lith\n0,10,10,SS\n10,20,10,QZ\n20,30,12,SH\n")
        .expect("write");

    let columns = IntervalColumns::default();
    let intervals = read_intervals_csv(&path, &columns).expect("read");
    let mut result = welllog_cache::validate_intervals(&intervals, Some(30.0));
    assert_eq!(result.warning_count(), 1, "thickness mismatch on row 2");

    let lookup = InMemoryCodeLookup::new()
        .with_code("lithology", "SS", "Sandstone")
        .with_code("lithology", "SH", "Shale");
    let column_map: BTreeMap<String, String> = [("Lith".to_string(), "lithology".to_string())].into();
    result.merge(welllog_cache::validate_dictionary_codes(&intervals, &lookup, &column_map));

    assert!(result.is_valid());
    assert_eq!(result.warning_count(), 2);
    let unknown: Vec<_> = result.issues_for_row(1).collect();
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].value.as_deref(), Some("QZ"));
}

#[test]
fn cli_validate_reports_and_fails_on_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("units.csv");
    std::fs::write(&path, "FROM,TO\n0,10\n12,20\n").expect("write");

    let output = cmd()
        .args(["validate", path.to_str().expect("utf8 path")])
        .output()
        .expect("run");
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("gap of 2.000 between rows 0, 1"), "{stdout}");
    assert!(stdout.contains("1 errors, 0 warnings"), "{stdout}");
}

#[test]
fn cli_info_on_csv() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("well.csv");
    std::fs::write(&path, "DEPTH,GR\n100.0,1\n100.5,2\n101.0,3\n").expect("write");

    let output = cmd()
        .args(["info", path.to_str().expect("utf8 path")])
        .output()
        .expect("run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("depth range:  100 .. 101"), "{stdout}");
    assert!(stdout.contains("depth step:   0.5"), "{stdout}");
    assert!(stdout.contains("curves:       GR"), "{stdout}");
}

#[test]
fn cli_accepts_huge_cache_limit() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("well.csv");
    std::fs::write(&path, "DEPTH,GR\n1.0,1\n2.0,2\n").expect("write");

    let output = cmd()
        .args(["--cache-limit-mb", &usize::MAX.to_string()])
        .args(["info", path.to_str().expect("utf8 path")])
        .output()
        .expect("run");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn generated_las_sample_carries_lithology() {
    let dir = tempfile::tempdir().expect("tempdir");
    let status = Command::new(env!("CARGO_BIN_EXE_generate_sample"))
        .arg(dir.path())
        .status()
        .expect("run");
    assert!(status.success());

    let mut ds = welllog_cache::open(dir.path().join("sample_well.las"));
    assert_eq!(ds.curve_names(), vec!["GR", "RHOB", "NPHI", "LITH"]);
    let table = ds.data_range((0.0, 0.2), Some(&["LITH"]));
    let lith = table.column("LITH").expect("lith");
    assert_eq!(lith.values.len(), 3);
    assert!(lith.values.iter().all(|v| v.to_string() == "SH"));
}
