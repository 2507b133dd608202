use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{bail, Context};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Column, LogTable};
use crate::error::{CoreError, Result};

// ---------------------------------------------------------------------------
// Reader seam
// ---------------------------------------------------------------------------

/// Turns a source file into a [`LogTable`]. Every call re-reads the whole
/// source; there is no seeking.
pub trait LogReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<LogTable>;
}

/// Reads log files from disk, dispatching by extension.
///
/// Supported formats:
/// * `.las`     – LAS 2.0 ASCII; the first curve becomes the row index
/// * `.csv`     – header row, one column per curve
/// * `.json`    – records (`[{"DEPT": 1.0, ...}]`) or columns (`{"DEPT": [...]}`)
/// * `.parquet` – flat numeric / text columns
#[derive(Debug, Clone, Copy, Default)]
pub struct FileReader;

impl LogReader for FileReader {
    fn read(&self, path: &Path) -> Result<LogTable> {
        std::fs::metadata(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let parsed = match ext.as_str() {
            "las" => load_las(path),
            "csv" => load_csv(path),
            "json" => load_json(path),
            "parquet" | "pq" => load_parquet(path),
            other => return Err(CoreError::UnsupportedFormat(other.to_string())),
        };
        parsed.map_err(|e| CoreError::parse(path, &e))
    }
}

/// Serves a fixed table from memory and counts how often it was read.
#[derive(Debug, Default)]
pub struct MemoryReader {
    table: Option<LogTable>,
    reads: AtomicU64,
}

impl MemoryReader {
    pub fn new(table: LogTable) -> Self {
        Self {
            table: Some(table),
            reads: AtomicU64::new(0),
        }
    }

    /// A reader whose source is always unreadable.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }
}

impl LogReader for MemoryReader {
    fn read(&self, path: &Path) -> Result<LogTable> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.table.clone().ok_or_else(|| CoreError::Io {
            path: PathBuf::from(path),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no table"),
        })
    }
}

// ---------------------------------------------------------------------------
// LAS loader
// ---------------------------------------------------------------------------

/// Minimal LAS 2.0 reader:
///
/// ```text
/// ~W
///  NULL.      -999.25 : NULL VALUE
/// ~C
///  DEPT.M             : DEPTH
///  GR  .GAPI          : GAMMA RAY
/// ~A
///  100.0   45.2
///  100.5   -999.25
/// ```
///
/// Wrapped data lines are joined by counting tokens per row.
fn load_las(path: &Path) -> anyhow::Result<LogTable> {
    let text = std::fs::read_to_string(path).context("reading LAS file")?;

    let mut section = ' ';
    let mut null_value: Option<f64> = None;
    let mut mnemonics: Vec<String> = Vec::new();
    let mut tokens: Vec<String> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix('~') {
            section = rest.chars().next().unwrap_or(' ').to_ascii_uppercase();
            continue;
        }
        match section {
            'W' => {
                let (mnemonic, value) = split_header_line(trimmed);
                if mnemonic.eq_ignore_ascii_case("NULL") {
                    null_value = value.parse::<f64>().ok();
                }
            }
            'C' => {
                let (mnemonic, _) = split_header_line(trimmed);
                if !mnemonic.is_empty() {
                    mnemonics.push(mnemonic.to_string());
                }
            }
            'A' => tokens.extend(trimmed.split_whitespace().map(str::to_string)),
            _ => {}
        }
    }

    if mnemonics.is_empty() {
        bail!("LAS file has no ~C curve section");
    }
    let width = mnemonics.len();
    if tokens.len() % width != 0 {
        bail!(
            "~A section has {} values, not a multiple of {width} curves",
            tokens.len()
        );
    }

    let mut columns: Vec<Vec<CellValue>> = vec![Vec::with_capacity(tokens.len() / width); width];
    for (i, tok) in tokens.iter().enumerate() {
        let value = match tok.parse::<f64>() {
            Ok(v) if null_value.is_some_and(|n| v == n) => CellValue::Null,
            Ok(v) => CellValue::Float(v),
            Err(_) => CellValue::guess(tok),
        };
        columns[i % width].push(value);
    }

    let mut named = mnemonics
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, values));
    let index = named.next().context("LAS file has no curves")?;
    Ok(LogTable::new(named.collect()).with_index(index))
}

/// `MNEM.UNIT  VALUE : DESCRIPTION` → (mnemonic, value)
fn split_header_line(line: &str) -> (&str, &str) {
    let Some((mnemonic, rest)) = line.split_once('.') else {
        return (line.trim(), "");
    };
    let before_colon = rest.rsplit_once(':').map_or(rest, |(head, _)| head);
    // The unit runs up to the first space right after the dot.
    let value = before_colon
        .split_once(char::is_whitespace)
        .map_or("", |(_, v)| v);
    (mnemonic.trim(), value.trim())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with curve names, one row per depth sample.
fn load_csv(path: &Path) -> anyhow::Result<LogTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: {} fields but {} headers",
                record.len(),
                headers.len()
            );
        }
        for (col, value) in columns.iter_mut().zip(record.iter()) {
            col.push(CellValue::guess(value));
        }
    }

    Ok(LogTable::new(
        headers
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Column::new(name, values))
            .collect(),
    ))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> anyhow::Result<LogTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    match root {
        JsonValue::Array(records) => json_records(&records),
        JsonValue::Object(map) => {
            let mut columns = Vec::with_capacity(map.len());
            for (name, values) in &map {
                let values = values
                    .as_array()
                    .with_context(|| format!("column '{name}' is not an array"))?;
                columns.push(Column::new(name.clone(), values.iter().map(json_to_cell).collect()));
            }
            let lens: Vec<usize> = columns.iter().map(|c| c.values.len()).collect();
            if lens.windows(2).any(|w| w[0] != w[1]) {
                bail!("columns have different lengths: {lens:?}");
            }
            Ok(LogTable::new(columns))
        }
        _ => bail!("Expected top-level JSON array or object"),
    }
}

/// Records-oriented: column order follows the first record.
fn json_records(records: &[JsonValue]) -> anyhow::Result<LogTable> {
    let Some(first) = records.first() else {
        return Ok(LogTable::empty());
    };
    let names: Vec<String> = first
        .as_object()
        .context("Row 0 is not a JSON object")?
        .keys()
        .cloned()
        .collect();

    let mut columns: Vec<Vec<CellValue>> = vec![Vec::with_capacity(records.len()); names.len()];
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for (name, col) in names.iter().zip(columns.iter_mut()) {
            col.push(obj.get(name).map_or(CellValue::Null, json_to_cell));
        }
    }

    Ok(LogTable::new(
        names
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Column::new(name, values))
            .collect(),
    ))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// One Parquet column per curve. Numeric columns of any width are widened
/// to `f64`/`i64`; strings and booleans are kept as text / bool cells.
fn load_parquet(path: &Path) -> anyhow::Result<LogTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); names.len()];
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (idx, col) in columns.iter_mut().enumerate() {
            let array = batch.column(idx);
            append_cells(array, col).with_context(|| format!("column '{}'", names[idx]))?;
        }
    }

    Ok(LogTable::new(
        names
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Column::new(name, values))
            .collect(),
    ))
}

fn append_cells(array: &ArrayRef, out: &mut Vec<CellValue>) -> anyhow::Result<()> {
    match array.data_type() {
        DataType::Float16 | DataType::Float32 | DataType::Float64 => {
            let widened = cast(array, &DataType::Float64).context("casting to f64")?;
            let values = widened.as_primitive::<Float64Type>();
            out.extend(values.iter().map(|v| v.map_or(CellValue::Null, CellValue::Float)));
        }
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => {
            let widened = cast(array, &DataType::Int64).context("casting to i64")?;
            let values = widened.as_primitive::<Int64Type>();
            out.extend(values.iter().map(|v| v.map_or(CellValue::Null, CellValue::Integer)));
        }
        DataType::Utf8 => {
            let values = array.as_string::<i32>();
            out.extend(
                values
                    .iter()
                    .map(|v| v.map_or(CellValue::Null, |s| CellValue::Text(s.to_string()))),
            );
        }
        DataType::LargeUtf8 => {
            let values = array.as_string::<i64>();
            out.extend(
                values
                    .iter()
                    .map(|v| v.map_or(CellValue::Null, |s| CellValue::Text(s.to_string()))),
            );
        }
        DataType::Boolean => {
            let values = array.as_boolean();
            out.extend(values.iter().map(|v| v.map_or(CellValue::Null, CellValue::Bool)));
        }
        other => bail!("unsupported column type {other:?}"),
    }
    Ok(())
}
