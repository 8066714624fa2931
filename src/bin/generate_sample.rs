use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, ensure};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::{Parser, ValueEnum};
use image::{Rgb, RgbImage};
use parquet::arrow::ArrowWriter;

/// Write a synthetic results tree for trying the viewer without real fits.
#[derive(Debug, Parser)]
struct Args {
    /// Output results directory.
    #[arg(long, default_value = "results")]
    out: PathBuf,

    /// Bursts per dataset.
    #[arg(long, default_value_t = 40)]
    bursts: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Table file format.
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Parquet,
}

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
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
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

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Log-uniform sample between two positive bounds.
    fn log_uniform(&mut self, lo: f64, hi: f64) -> f64 {
        10f64.powf(self.uniform(lo.log10(), hi.log10()))
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n.max(1)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

// ---------------------------------------------------------------------------
// Column model shared by the CSV and Parquet writers
// ---------------------------------------------------------------------------

enum ColumnData {
    Text(Vec<String>),
    Int(Vec<i64>),
    Float(Vec<Option<f64>>),
}

struct Column {
    name: &'static str,
    data: ColumnData,
}

impl Column {
    fn cell(&self, row: usize) -> String {
        match &self.data {
            ColumnData::Text(v) => v[row].clone(),
            ColumnData::Int(v) => v[row].to_string(),
            ColumnData::Float(v) => v[row].map(|f| format!("{f:.6e}")).unwrap_or_default(),
        }
    }

    fn len(&self) -> usize {
        match &self.data {
            ColumnData::Text(v) => v.len(),
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
        }
    }
}

fn write_table(dir: &Path, stem: &str, columns: &[Column], format: Format) -> Result<()> {
    match format {
        Format::Csv => write_csv(&dir.join(format!("{stem}.csv")), columns),
        Format::Parquet => write_parquet(&dir.join(format!("{stem}.parquet")), columns),
    }
}

fn write_csv(path: &Path, columns: &[Column]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(columns.iter().map(|c| c.name))?;
    let n_rows = columns.first().map(Column::len).unwrap_or(0);
    for row in 0..n_rows {
        writer.write_record(columns.iter().map(|c| c.cell(row)))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, columns: &[Column]) -> Result<()> {
    let fields: Vec<Field> = columns
        .iter()
        .map(|c| match c.data {
            ColumnData::Text(_) => Field::new(c.name, DataType::Utf8, false),
            ColumnData::Int(_) => Field::new(c.name, DataType::Int64, false),
            ColumnData::Float(_) => Field::new(c.name, DataType::Float64, true),
        })
        .collect();
    let arrays: Vec<ArrayRef> = columns
        .iter()
        .map(|c| -> ArrayRef {
            match &c.data {
                ColumnData::Text(v) => Arc::new(StringArray::from(v.clone())),
                ColumnData::Int(v) => Arc::new(Int64Array::from(v.clone())),
                ColumnData::Float(v) => Arc::new(Float64Array::from(v.clone())),
            }
        })
        .collect();

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Synthetic bursts
// ---------------------------------------------------------------------------

struct Burst {
    name: String,
    alpha_1: f64,
    alpha_2: Option<f64>,
    t_break: f64,
    norm: f64,
}

impl Burst {
    /// Broken power-law flux at time `t` (seconds).
    fn flux(&self, t: f64) -> f64 {
        match self.alpha_2 {
            Some(a2) if t > self.t_break => {
                self.norm * self.t_break.powf(-self.alpha_1) * (t / self.t_break).powf(-a2)
            }
            _ => self.norm * t.powf(-self.alpha_1),
        }
    }
}

/// Distinct names [`burst_name`] can produce: years, months, days, letters.
const BURST_NAME_SPACE: usize = 20 * 12 * 28 * 3;

fn burst_name(rng: &mut SimpleRng) -> String {
    let yy = 5 + rng.below(20);
    let mm = 1 + rng.below(12);
    let dd = 1 + rng.below(28);
    let letter = (b'A' + rng.below(3) as u8) as char;
    format!("GRB{yy:02}{mm:02}{dd:02}{letter}")
}

/// Log-log light curve on a dark background, drawn point by point.
fn render_light_curve(burst: &Burst, rng: &mut SimpleRng, color: Rgb<u8>) -> RgbImage {
    const W: u32 = 480;
    const H: u32 = 320;
    const MARGIN: u32 = 30;
    let mut img = RgbImage::from_pixel(W, H, Rgb([17, 17, 17]));

    let axis = Rgb([140, 140, 140]);
    for x in MARGIN..W - MARGIN {
        img.put_pixel(x, H - MARGIN, axis);
    }
    for y in MARGIN..H - MARGIN {
        img.put_pixel(MARGIN, y, axis);
    }

    let (lt_min, lt_max) = (1.0, 6.0);
    let samples: Vec<(f64, f64)> = (0..120)
        .map(|i| {
            let lt = lt_min + (lt_max - lt_min) * i as f64 / 119.0;
            let scatter = 1.0 + rng.uniform(-0.15, 0.15);
            (lt, (burst.flux(10f64.powf(lt)) * scatter).log10())
        })
        .collect();
    let lf_max = samples.iter().map(|s| s.1).fold(f64::NEG_INFINITY, f64::max);
    let lf_min = samples.iter().map(|s| s.1).fold(f64::INFINITY, f64::min);
    let span = (lf_max - lf_min).max(1e-9);

    let plot_w = (W - 2 * MARGIN) as f64;
    let plot_h = (H - 2 * MARGIN) as f64;
    for (lt, lf) in samples {
        let px = MARGIN as f64 + (lt - lt_min) / (lt_max - lt_min) * plot_w;
        let py = (H - MARGIN) as f64 - (lf - lf_min) / span * plot_h;
        for dx in -1i32..=1 {
            for dy in -1i32..=1 {
                let x = (px as i32 + dx).clamp(0, W as i32 - 1) as u32;
                let y = (py as i32 + dy).clamp(0, H as i32 - 1) as u32;
                img.put_pixel(x, y, color);
            }
        }
    }
    img
}

fn write_dataset(dir: &Path, args: &Args, rng: &mut SimpleRng) -> Result<usize> {
    ensure!(
        args.bursts <= BURST_NAME_SPACE,
        "--bursts {} exceeds the {BURST_NAME_SPACE} distinct burst names available",
        args.bursts
    );
    fs::create_dir_all(dir.join("figures/xrt"))?;
    fs::create_dir_all(dir.join("figures/bat"))?;

    let mut names = Vec::new();
    while names.len() < args.bursts {
        let name = burst_name(rng);
        if !names.contains(&name) {
            names.push(name);
        }
    }

    let bursts: Vec<Burst> = names
        .into_iter()
        .map(|name| {
            let alpha_1 = rng.uniform(0.2, 1.2);
            Burst {
                name,
                alpha_1,
                alpha_2: rng.chance(0.7).then(|| alpha_1 + rng.uniform(0.3, 1.2)),
                t_break: rng.log_uniform(1e3, 1e5),
                norm: rng.log_uniform(1e-10, 1e-8),
            }
        })
        .collect();

    let afterglow = vec![
        Column {
            name: "GRBname",
            data: ColumnData::Text(bursts.iter().map(|b| b.name.clone()).collect()),
        },
        Column {
            name: "n_breaks",
            data: ColumnData::Int(bursts.iter().map(|b| b.alpha_2.is_some() as i64).collect()),
        },
        Column {
            name: "alpha_1",
            data: ColumnData::Float(bursts.iter().map(|b| Some(b.alpha_1)).collect()),
        },
        Column {
            name: "alpha_2",
            data: ColumnData::Float(bursts.iter().map(|b| b.alpha_2).collect()),
        },
        Column {
            name: "t_break",
            data: ColumnData::Float(
                bursts.iter().map(|b| b.alpha_2.map(|_| b.t_break)).collect(),
            ),
        },
        Column {
            name: "flux_1e4",
            data: ColumnData::Float(bursts.iter().map(|b| Some(b.flux(1e4))).collect()),
        },
        Column {
            name: "chi2_red",
            data: ColumnData::Float(bursts.iter().map(|_| Some(rng.uniform(0.7, 1.6))).collect()),
        },
    ];
    write_table(dir, "afterglow", &afterglow, args.format)?;

    let (mut f_name, mut f_idx, mut f_peak, mut f_fluence) = (vec![], vec![], vec![], vec![]);
    let (mut p_name, mut p_idx, mut p_peak, mut p_width) = (vec![], vec![], vec![], vec![]);
    for b in &bursts {
        for i in 0..rng.below(4) {
            f_name.push(b.name.clone());
            f_idx.push(i as i64 + 1);
            f_peak.push(Some(rng.log_uniform(100.0, 5e4)));
            f_fluence.push(Some(rng.log_uniform(1e-9, 1e-6)));
        }
        for i in 0..1 + rng.below(3) {
            p_name.push(b.name.clone());
            p_idx.push(i as i64 + 1);
            p_peak.push(Some(rng.uniform(-5.0, 100.0)));
            p_width.push(Some(rng.log_uniform(0.1, 20.0)));
        }
    }
    let flares = vec![
        Column { name: "GRBname", data: ColumnData::Text(f_name) },
        Column { name: "flare", data: ColumnData::Int(f_idx) },
        Column { name: "t_peak", data: ColumnData::Float(f_peak) },
        Column { name: "fluence", data: ColumnData::Float(f_fluence) },
    ];
    write_table(dir, "flares", &flares, args.format)?;

    let pulses = vec![
        Column { name: "GRBname", data: ColumnData::Text(p_name) },
        Column { name: "pulse", data: ColumnData::Int(p_idx) },
        Column { name: "t_peak", data: ColumnData::Float(p_peak) },
        Column { name: "width", data: ColumnData::Float(p_width) },
    ];
    write_table(dir, "pulses", &pulses, args.format)?;

    // Most bursts get an XRT fit; fewer have a BAT one.
    for b in &bursts {
        if rng.chance(0.9) {
            let img = render_light_curve(b, rng, Rgb([99, 110, 250]));
            img.save(dir.join("figures/xrt").join(format!("{}.png", b.name)))?;
        }
        if rng.chance(0.6) {
            let img = render_light_curve(b, rng, Rgb([239, 85, 59]));
            img.save(dir.join("figures/bat").join(format!("{}.png", b.name)))?;
        }
    }

    Ok(bursts.len())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    for folder in ["2312_4.2", "2401_5.1"] {
        let dir = args.out.join(folder);
        let n = write_dataset(&dir, &args, &mut rng)
            .with_context(|| format!("writing dataset {}", dir.display()))?;
        println!("Wrote {n} bursts to {}", dir.display());
    }
    Ok(())
}
