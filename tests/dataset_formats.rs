// End-to-end range queries against real files in every supported format.
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use welllog_cache::data::loader::FileReader;
use welllog_cache::{CacheConfig, CellValue, Dataset, DatasetState};

fn write_step_csv(path: &Path) {
    let mut text = String::from("DEPTH,GR,LITH\n");
    for i in 0..=10_000 {
        let depth = i as f64 / 10.0;
        text.push_str(&format!("{depth:.1},{},SH\n", 40.0 + (i % 50) as f64));
    }
    std::fs::write(path, text).expect("write csv");
}

#[test]
fn csv_range_is_inclusive_on_both_ends() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("well.csv");
    write_step_csv(&path);

    let mut ds = welllog_cache::open(&path);
    assert_eq!(ds.state(), &DatasetState::Ready);
    assert_eq!(ds.depth_range(), (0.0, 1000.0));
    assert_eq!(ds.curve_names(), vec!["GR", "LITH"]);

    let table = ds.data_range((100.0, 110.0), None);
    let depths = table.numeric_values("DEPTH").expect("depth");
    assert_eq!(depths.len(), 101);
    assert_eq!(depths.first(), Some(&100.0));
    assert_eq!(depths.last(), Some(&110.0));
    assert!(depths.iter().all(|d| (100.0..=110.0).contains(d)));
    assert_eq!(table.column_names(), vec!["DEPTH", "GR", "LITH"]);
}

#[test]
fn depth_index_is_strictly_increasing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("unsorted.csv");
    std::fs::write(&path, "GR,MD\n1,30\n2,10\n3,20\n4,10\n5,\n").expect("write");

    let ds = welllog_cache::open(&path);
    assert_eq!(ds.depth_column(), Some("MD"));
    let index = ds.depth_index().as_slice();
    assert_eq!(index, &[10.0, 20.0, 30.0]);
    assert!(index.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn las_depth_comes_from_row_index() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("well.las");
    std::fs::write(
        &path,
        "~Version\n VERS. 2.0 : LAS\n~Well\n NULL. -999.25 : NULL VALUE\n\
         ~Curve\n DEPT.M : DEPTH\n GR  .GAPI : GAMMA RAY\n RHOB.G/C3 : DENSITY\n\
         ~A\n 100.0 45.0 2.30\n 100.5 50.0 -999.25\n 101.0 55.0 2.40\n 101.5 60.0 2.45\n",
    )
    .expect("write");

    let mut ds = welllog_cache::open(&path);
    assert_eq!(ds.depth_column(), Some("DEPT"));
    assert_eq!(ds.curve_names(), vec!["GR", "RHOB"]);
    assert_eq!(ds.depth_range(), (100.0, 101.5));

    let table = ds.data_range((100.5, 101.0), Some(&["RHOB"]));
    assert_eq!(table.index_name(), Some("DEPT"));
    assert_eq!(table.column_names(), vec!["RHOB"]);
    let rhob = table.column("RHOB").expect("rhob");
    assert_eq!(rhob.values, vec![CellValue::Null, CellValue::Float(2.40)]);

    let stats = ds.curve_statistics("RHOB").expect("stats");
    assert_eq!(stats.count, 3);
    assert_eq!(stats.min, 2.30);
    assert_eq!(stats.max, 2.45);
}

#[test]
fn json_records_and_columns() {
    let dir = tempfile::tempdir().expect("tempdir");
    let records = dir.path().join("records.json");
    std::fs::write(&records, r#"[{"DEPTH": 1.0, "GR": 10}, {"DEPTH": 2.0, "GR": 20}]"#)
        .expect("write");
    let columns = dir.path().join("columns.json");
    std::fs::write(&columns, r#"{"DEPTH": [1.0, 2.0, 3.0], "GR": [1, null, 3]}"#).expect("write");

    let mut ds = welllog_cache::open(&records);
    assert_eq!(ds.data_range((0.0, 1.5), None).num_rows(), 1);

    let mut ds = welllog_cache::open(&columns);
    let stats = ds.curve_statistics("GR").expect("stats");
    assert_eq!((stats.count, stats.mean), (2, 2.0));
}

#[test]
fn json_keeps_file_column_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let columns = dir.path().join("columns.json");
    std::fs::write(
        &columns,
        r#"{"ZED": [1, 2], "MD_TVD": [5.0, 6.0], "DEPTH": [1.0, 2.0], "ALPHA": [3, 4]}"#,
    )
    .expect("write");
    let ds = welllog_cache::open(&columns);
    assert_eq!(ds.depth_column(), Some("MD_TVD"));
    assert_eq!(ds.curve_names(), vec!["ZED", "DEPTH", "ALPHA"]);

    let records = dir.path().join("records.json");
    std::fs::write(&records, r#"[{"ZED": 1, "DEPTH": 1.0, "ALPHA": 3}]"#).expect("write");
    let ds = welllog_cache::open(&records);
    assert_eq!(ds.depth_column(), Some("DEPTH"));
    assert_eq!(ds.curve_names(), vec!["ZED", "ALPHA"]);
}

#[test]
fn parquet_curves_are_read() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("well.parquet");
    let schema = Arc::new(Schema::new(vec![
        Field::new("DEPTH", DataType::Float64, false),
        Field::new("GR", DataType::Float64, true),
        Field::new("LITH", DataType::Utf8, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Float64Array::from(vec![10.0, 10.5, 11.0, 11.5])),
        Arc::new(Float64Array::from(vec![Some(1.0), None, Some(3.0), Some(5.0)])),
        Arc::new(StringArray::from(vec!["SS", "SS", "SH", "SH"])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).expect("batch");
    let file = std::fs::File::create(&path).expect("create");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("writer");
    writer.write(&batch).expect("write");
    writer.close().expect("close");

    let mut ds = welllog_cache::open(&path);
    assert_eq!(ds.curve_names(), vec!["GR", "LITH"]);
    let table = ds.data_range((10.5, 11.0), Some(&["LITH"]));
    assert_eq!(
        table.column("LITH").map(|c| c.values.clone()),
        Some(vec![CellValue::Text("SS".into()), CellValue::Text("SH".into())])
    );
    let stats = ds.curve_statistics("GR").expect("stats");
    assert_eq!((stats.min, stats.max, stats.mean, stats.count), (1.0, 5.0, 3.0, 3));
}

#[test]
fn missing_file_is_degraded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut ds = welllog_cache::open(dir.path().join("nope.las"));
    assert!(ds.is_degraded());
    assert_eq!(welllog_cache::get_depth_range(&ds), (0.0, 1000.0));
    assert!(welllog_cache::get_curve_names(&ds).is_empty());
    assert!(welllog_cache::get_data_range(&mut ds, (0.0, 10.0), None).is_empty());
    assert!(Dataset::try_open(dir.path().join("nope.las")).is_err());

    let err = ds.try_data_range((0.0, 10.0), None).unwrap_err();
    assert!(err.to_string().contains("cannot read"), "{err}");
}

#[test]
fn file_without_depth_column_is_degraded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nodepth.csv");
    std::fs::write(&path, "GR,RHOB\n1,2.3\n2,2.4\n").expect("write");

    let mut ds = welllog_cache::open(&path);
    assert!(ds.is_degraded());
    assert_eq!(ds.depth_range(), (0.0, 1000.0));
    assert!(ds.curve_names().is_empty());
    assert_eq!(ds.curve_statistics("GR"), None);
    assert_eq!(ds.memory_statistics().entry_count, 0);
}

#[test]
fn eviction_drops_oldest_quarter_then_inserts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("well.csv");
    write_step_csv(&path);

    let mut sizing = welllog_cache::open(&path);
    let entry_size = sizing.data_range((-0.05, 0.95), Some(&["GR"])).estimated_bytes();

    let config = CacheConfig::with_size_limit(entry_size * 8);
    let mut ds = Dataset::open_with(&path, Arc::new(FileReader), config);
    for i in 0..8 {
        let start = i as f64 * 10.0;
        ds.data_range((start - 0.05, start + 0.95), Some(&["GR"]));
    }
    let full = ds.memory_statistics();
    assert_eq!(full.entry_count, 8);
    assert_eq!(full.cache_size, entry_size * 8);

    ds.data_range((499.95, 500.95), Some(&["GR"]));
    let after = ds.memory_statistics();
    assert_eq!(after.evictions, 2);
    assert_eq!(after.entry_count, 7);
    assert_eq!(after.cache_size, entry_size * 7);

    // The two oldest ranges are gone and must be re-read.
    let reads = after.disk_reads;
    ds.data_range((-0.05, 0.95), Some(&["GR"]));
    assert_eq!(ds.memory_statistics().disk_reads, reads + 1);
}

#[test]
fn clear_resets_cache_and_telemetry() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("well.csv");
    write_step_csv(&path);

    let mut ds = welllog_cache::open(&path);
    for _ in 0..3 {
        ds.data_range((1.0, 2.0), None);
    }
    assert_eq!(ds.memory_statistics().hits, 2);

    welllog_cache::clear_cache(&mut ds);
    let stats = welllog_cache::get_memory_statistics(&ds);
    assert_eq!((stats.hits, stats.misses, stats.disk_reads), (0, 0, 0));
    assert_eq!((stats.cache_size, stats.entry_count), (0, 0));
    assert_eq!(stats.hit_rate, 0.0);

    welllog_cache::close(&mut ds);
    assert_eq!(ds.state(), &DatasetState::Closed);
    assert!(ds.data_range((1.0, 2.0), None).is_empty());
}
