use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use welllog_cache::data::loader::FileReader;
use welllog_cache::validate::interval::read_intervals_csv;
use welllog_cache::{
    AppConfig, CurveStatistics, Dataset, DatasetState, InMemoryCodeLookup, IntervalColumns,
    Validator,
};

#[derive(Parser)]
#[command(
    name = "welllog-cache",
    version,
    about = "Inspect well-log curves through a depth-range cache and check interval tables"
)]
struct Cli {
    #[arg(long, global = true, help = "JSON settings file")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Cache size limit in MiB (overrides the settings file)")]
    cache_limit_mb: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Depth range, sampling step and curve list of a log file.
    Info { file: PathBuf },

    /// Print the rows of a depth range as CSV.
    Range {
        file: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        min: f64,
        #[arg(long, allow_hyphen_values = true)]
        max: f64,
        #[arg(long, value_delimiter = ',', help = "Comma-separated curve names (default: all)")]
        curves: Vec<String>,
    },

    /// Curve statistics and cache telemetry as JSON.
    Stats {
        file: PathBuf,
        #[arg(long, help = "Only this curve (default: every curve)")]
        curve: Option<String>,
    },

    /// Check an interval table for gaps, overlaps and unknown codes.
    Validate {
        intervals: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        total_depth: Option<f64>,
        #[arg(long, help = "Code dictionary CSV: category,code,description")]
        dictionary: Option<PathBuf>,
        #[arg(long = "code-column", value_parser = parse_mapping, help = "COLUMN=CATEGORY, repeatable")]
        code_columns: Vec<(String, String)>,
        #[arg(long, default_value = "FROM")]
        from_column: String,
        #[arg(long, default_value = "TO")]
        to_column: String,
        #[arg(long, default_value = "THICKNESS")]
        thickness_column: String,
    },
}

fn parse_mapping(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((column, category)) if !column.is_empty() && !category.is_empty() => {
            Ok((column.to_string(), category.to_string()))
        }
        _ => Err(format!("expected COLUMN=CATEGORY, got '{s}'")),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_json_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(mb) = cli.cache_limit_mb {
        config.cache.size_limit_bytes = mb.saturating_mul(1024 * 1024);
    }

    match cli.command {
        Command::Info { file } => info(&open(&file, &config)),
        Command::Range {
            file,
            min,
            max,
            curves,
        } => range(&mut open(&file, &config), min, max, &curves),
        Command::Stats { file, curve } => stats(&mut open(&file, &config), curve.as_deref()),
        Command::Validate {
            intervals,
            total_depth,
            dictionary,
            code_columns,
            from_column,
            to_column,
            thickness_column,
        } => {
            let columns = IntervalColumns {
                from: from_column,
                to: to_column,
                thickness: thickness_column,
            };
            validate(
                &config,
                &intervals,
                &columns,
                total_depth,
                dictionary.as_deref(),
                code_columns.into_iter().collect(),
            )
        }
    }
}

fn open(path: &Path, config: &AppConfig) -> Dataset {
    Dataset::open_with(path, Arc::new(FileReader), config.cache.clone())
}

fn info(dataset: &Dataset) -> Result<ExitCode> {
    let (min, max) = dataset.depth_range();
    println!("file:         {}", dataset.path().display());
    println!("size:         {} bytes", dataset.file_size());
    match dataset.state() {
        DatasetState::Ready => println!("state:        ready"),
        DatasetState::Degraded { reason } => println!("state:        degraded ({reason})"),
        DatasetState::Closed => println!("state:        closed"),
    }
    println!("depth column: {}", dataset.depth_column().unwrap_or("-"));
    println!("depth range:  {min} .. {max}");
    match dataset.depth_step() {
        Some(step) => println!("depth step:   {step}"),
        None => println!("depth step:   -"),
    }
    println!("samples:      {}", dataset.row_count());
    println!("curves:       {}", dataset.curve_names().join(", "));
    Ok(ExitCode::SUCCESS)
}

fn range(dataset: &mut Dataset, min: f64, max: f64, curves: &[String]) -> Result<ExitCode> {
    if min > max {
        bail!("--min {min} is greater than --max {max}");
    }
    let names: Vec<&str> = curves.iter().map(String::as_str).collect();
    let columns = (!names.is_empty()).then_some(names.as_slice());
    let table = dataset.try_data_range((min, max), columns)?;

    let stdout = std::io::stdout();
    let mut writer = csv::Writer::from_writer(stdout.lock());
    let mut header: Vec<String> = table.index.iter().map(|c| c.name.clone()).collect();
    header.extend(table.column_names());
    writer.write_record(&header).context("writing CSV header")?;

    let all: Vec<_> = table.index.iter().chain(table.columns.iter()).collect();
    for row in 0..table.num_rows() {
        writer
            .write_record(all.iter().map(|c| c.values[row].to_string()))
            .context("writing CSV row")?;
    }
    writer.flush().context("flushing output")?;
    Ok(ExitCode::SUCCESS)
}

fn stats(dataset: &mut Dataset, curve: Option<&str>) -> Result<ExitCode> {
    let names = match curve {
        Some(name) => vec![name.to_string()],
        None => dataset.curve_names(),
    };
    let curves: BTreeMap<String, Option<CurveStatistics>> = names
        .into_iter()
        .map(|name| {
            let stats = dataset.curve_statistics(&name);
            (name, stats)
        })
        .collect();

    let report = serde_json::json!({
        "curves": curves,
        "memory": dataset.memory_statistics(),
    });
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &report).context("writing JSON")?;
    writeln!(out)?;
    Ok(ExitCode::SUCCESS)
}

fn validate(
    config: &AppConfig,
    path: &Path,
    columns: &IntervalColumns,
    total_depth: Option<f64>,
    dictionary: Option<&Path>,
    column_map: BTreeMap<String, String>,
) -> Result<ExitCode> {
    let intervals = read_intervals_csv(path, columns)?;
    let mut result = Validator::new(config.validator.clone()).validate(&intervals, total_depth);

    if !column_map.is_empty() {
        let lookup = match dictionary {
            Some(path) => InMemoryCodeLookup::from_csv(path)?,
            None => InMemoryCodeLookup::unloaded(),
        };
        result.merge(welllog_cache::validate_dictionary_codes(
            &intervals,
            &lookup,
            &column_map,
        ));
    }

    for issue in &result.issues {
        println!("{issue}");
    }
    println!(
        "{} intervals: {} errors, {} warnings",
        intervals.len(),
        result.error_count(),
        result.warning_count()
    );
    Ok(if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
