use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const NULL_VALUE: f64 = -999.25;

/// Lithology units as (top, base, code): shale-sand-shale-limestone.
const UNITS: [(f64, f64, &str); 6] = [
    (0.0, 180.0, "SH"),
    (180.0, 320.0, "SS"),
    (320.0, 455.5, "SH"),
    (455.5, 610.0, "LS"),
    (610.0, 820.0, "SS"),
    (820.0, 1000.0, "SH"),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Typical (GR, RHOB, NPHI) response per lithology.
fn response(code: &str) -> (f64, f64, f64) {
    match code {
        "SS" => (35.0, 2.32, 0.18),
        "LS" => (20.0, 2.60, 0.08),
        _ => (110.0, 2.45, 0.32),
    }
}

fn unit_at(depth: f64) -> &'static str {
    UNITS
        .iter()
        .find(|(top, base, _)| depth >= *top && depth < *base)
        .map_or("SH", |&(_, _, code)| code)
}

struct WellLog {
    depth: Vec<f64>,
    gr: Vec<f64>,
    rhob: Vec<f64>,
    nphi: Vec<f64>,
    lith: Vec<&'static str>,
}

fn generate(rng: &mut SimpleRng) -> WellLog {
    // 0 → 1000 m at 0.1 m; computed from the step index to avoid drift.
    let depth: Vec<f64> = (0..=10_000).map(|i| i as f64 / 10.0).collect();
    let mut log = WellLog {
        gr: Vec::with_capacity(depth.len()),
        rhob: Vec::with_capacity(depth.len()),
        nphi: Vec::with_capacity(depth.len()),
        lith: Vec::with_capacity(depth.len()),
        depth,
    };
    for &d in &log.depth {
        let code = unit_at(d);
        let (gr, rhob, nphi) = response(code);
        // Tool dropouts show up as nulls in the density log.
        let dropout = rng.next_f64() < 0.002;
        log.gr.push(rng.gauss(gr, 6.0));
        log.rhob
            .push(if dropout { NULL_VALUE } else { rng.gauss(rhob, 0.03) });
        log.nphi.push(rng.gauss(nphi, 0.02).max(0.0));
        log.lith.push(code);
    }
    log
}

fn write_csv(log: &WellLog, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(["DEPTH", "GR", "RHOB", "NPHI", "LITH"])?;
    for i in 0..log.depth.len() {
        let rhob = if log.rhob[i] == NULL_VALUE {
            String::new()
        } else {
            format!("{:.4}", log.rhob[i])
        };
        writer.write_record([
            format!("{:.1}", log.depth[i]),
            format!("{:.3}", log.gr[i]),
            rhob,
            format!("{:.4}", log.nphi[i]),
            log.lith[i].to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_las(log: &WellLog, path: &Path) -> Result<()> {
    let mut out = String::new();
    writeln!(out, "~Version Information")?;
    writeln!(out, " VERS.   2.0 : CWLS LOG ASCII STANDARD - VERSION 2.0")?;
    writeln!(out, " WRAP.   NO  : ONE LINE PER DEPTH STEP")?;
    writeln!(out, "~Well Information")?;
    writeln!(out, " STRT.M       0.0 : START DEPTH")?;
    writeln!(out, " STOP.M    1000.0 : STOP DEPTH")?;
    writeln!(out, " STEP.M       0.1 : STEP")?;
    writeln!(out, " NULL.    {NULL_VALUE} : NULL VALUE")?;
    writeln!(out, " WELL.   SYNTHETIC-1 : WELL")?;
    writeln!(out, "~Curve Information")?;
    writeln!(out, " DEPT.M          : DEPTH")?;
    writeln!(out, " GR  .GAPI       : GAMMA RAY")?;
    writeln!(out, " RHOB.G/C3       : BULK DENSITY")?;
    writeln!(out, " NPHI.V/V        : NEUTRON POROSITY")?;
    writeln!(out, " LITH.           : LITHOLOGY CODE")?;
    writeln!(out, "~A")?;
    for i in 0..log.depth.len() {
        writeln!(
            out,
            "{:>10.1} {:>10.3} {:>10.4} {:>10.4} {:>6}",
            log.depth[i], log.gr[i], log.rhob[i], log.nphi[i], log.lith[i]
        )?;
    }
    std::fs::write(path, out).context("writing LAS")
}

fn write_parquet(log: &WellLog, path: &Path) -> Result<()> {
    let rhob: Float64Array = log
        .rhob
        .iter()
        .map(|&v| (v != NULL_VALUE).then_some(v))
        .collect();
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Float64Array::from(log.depth.clone())),
        Arc::new(Float64Array::from(log.gr.clone())),
        Arc::new(rhob),
        Arc::new(Float64Array::from(log.nphi.clone())),
        Arc::new(StringArray::from(log.lith.clone())),
    ];
    let schema = Arc::new(Schema::new(vec![
        Field::new("DEPTH", DataType::Float64, false),
        Field::new("GR", DataType::Float64, false),
        Field::new("RHOB", DataType::Float64, true),
        Field::new("NPHI", DataType::Float64, false),
        Field::new("LITH", DataType::Utf8, false),
    ]));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn write_intervals(path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating interval CSV")?;
    writer.write_record(["FROM", "TO", "THICKNESS", "LITH"])?;
    for (top, base, code) in UNITS {
        writer.write_record([
            top.to_string(),
            base.to_string(),
            format!("{:.1}", base - top),
            code.to_string(),
        ])?;
    }
    writer.flush()?;

    let codes = [
        ("lithology", "SH", "Shale"),
        ("lithology", "SS", "Sandstone"),
        ("lithology", "LS", "Limestone"),
    ];
    let mut writer = csv::Writer::from_path(path.with_file_name("codes.csv"))
        .context("creating code CSV")?;
    writer.write_record(["category", "code", "description"])?;
    for record in codes {
        writer.write_record([record.0, record.1, record.2])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir).context("creating output directory")?;

    let mut rng = SimpleRng::new(42);
    let log = generate(&mut rng);

    write_csv(&log, &out_dir.join("sample_well.csv"))?;
    write_las(&log, &out_dir.join("sample_well.las"))?;
    write_parquet(&log, &out_dir.join("sample_well.parquet"))?;
    write_intervals(&out_dir.join("intervals.csv"))?;

    println!(
        "Wrote {} depth samples (0-1000 m, 0.1 m step) and {} intervals to {}",
        log.depth.len(),
        UNITS.len(),
        out_dir.display()
    );
    Ok(())
}
