use std::f64::consts::PI;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rusty_echem::config::{Annotation, FigureConfig};

const CYCLE_PTS: usize = 200;
const HEADER_ROWS: usize = 2;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + std_dev * z
    }
}

// ---------------------------------------------------------------------------
// Synthetic traces
// ---------------------------------------------------------------------------

/// Time and potential for `cycles` half-cycles, with a few stray samples at
/// the end so the partition has a remainder to drop.
fn cp_half(cycles: usize, sign: f64, rng: &mut SimpleRng) -> (Vec<f64>, Vec<f64>) {
    let n = cycles * CYCLE_PTS + 17;
    let time: Vec<f64> = (0..n).map(|i| i as f64 * 0.5).collect();
    let potential = (0..n)
        .map(|i| {
            let cycle = (i / CYCLE_PTS) as f64;
            let phase = (i % CYCLE_PTS) as f64 / CYCLE_PTS as f64;
            // overpotential grows slowly with cycling
            let plateau = 0.05 + 0.004 * cycle;
            sign * (plateau + 0.02 * (1.0 - (-8.0 * phase).exp())) + rng.gauss(0.0, 0.0005)
        })
        .collect();
    (time, potential)
}

fn write_cp_parquet(path: &Path, time: Vec<f64>, potential: Vec<f64>) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("time", DataType::Float64, false),
        Field::new("<Ewe>", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(time)),
            Arc::new(Float64Array::from(potential)),
        ],
    )
    .context("building record batch")?;

    let file = fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn write_cp_csv(path: &Path, time: &[f64], potential: &[f64]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(["time", "<Ewe>"])?;
    for (t, e) in time.iter().zip(potential) {
        writer.write_record([t.to_string(), e.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Three impedance sweeps of a growing semicircle.
fn write_eis(path: &Path, rng: &mut SimpleRng) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(["time/s", "Re(Z)/Ohm", "-Im(Z)/Ohm"])?;
    for cycle in 0..3 {
        let r_ct = 50.0 + 15.0 * cycle as f64;
        for k in 0..CYCLE_PTS {
            let theta = PI * k as f64 / (CYCLE_PTS - 1) as f64;
            let re = 10.0 + r_ct / 2.0 * (1.0 - theta.cos()) + rng.gauss(0.0, 0.2);
            let im = r_ct / 2.0 * theta.sin() + rng.gauss(0.0, 0.2);
            let t = (cycle * CYCLE_PTS + k) as f64 * 2.0;
            writer.write_record([t.to_string(), re.to_string(), im.to_string()])?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Diffraction pattern with peaks at `peaks` (2θ, width, height).
fn write_pattern(path: &Path, peaks: &[(f64, f64, f64)], with_err: bool, rng: &mut SimpleRng) -> Result<()> {
    let mut out = fs::File::create(path).context("creating pattern")?;
    writeln!(out, "synthetic pattern, Cu Ka")?;
    writeln!(out, "2theta intensity{}", if with_err { " error" } else { "" })?;
    for i in 0..3000 {
        let tt = 10.0 + i as f64 * 0.02;
        let y: f64 = 20.0
            + peaks
                .iter()
                .map(|&(mu, sigma, amp)| gaussian(tt, mu, sigma, amp))
                .sum::<f64>()
            + rng.gauss(0.0, 1.5);
        if with_err {
            writeln!(out, "{tt:.3} {y:.4} {:.4}", y.abs().sqrt())?;
        } else {
            writeln!(out, "{tt:.3} {y:.4}")?;
        }
    }
    Ok(())
}

/// Damped-oscillation G(r) with a slightly off fit.
fn write_pdf(path: &Path, rng: &mut SimpleRng) -> Result<()> {
    let mut out = fs::File::create(path).context("creating PDF file")?;
    writeln!(out, "# synthetic refinement")?;
    writeln!(out, "r G Gdiff Gcalc")?;
    for i in 0..1500 {
        let r = 1.0 + i as f64 * 0.01;
        let calc = (-(r / 8.0)).exp() * (2.0 * PI * r / 2.8).sin() * 3.0;
        let g = calc + rng.gauss(0.0, 0.05);
        writeln!(out, "{r:.3} {g:.5} {:.5} {calc:.5}", g - calc)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let dir = Path::new("sample_data");
    fs::create_dir_all(dir).context("creating sample_data/")?;

    let (t_pos, e_pos) = cp_half(5, 1.0, &mut rng);
    let (t_neg, e_neg) = cp_half(4, -1.0, &mut rng);
    write_cp_parquet(&dir.join("cp_pos.parquet"), t_pos, e_pos)?;
    write_cp_csv(&dir.join("cp_neg.csv"), &t_neg, &e_neg)?;

    write_eis(&dir.join("eis.csv"), &mut rng)?;

    write_pattern(
        &dir.join("LiCoO2.xye"),
        &[(18.9, 0.08, 900.0), (37.4, 0.1, 300.0), (45.2, 0.1, 350.0)],
        true,
        &mut rng,
    )?;
    write_pattern(
        &dir.join("NMC811.xy"),
        &[(18.7, 0.09, 800.0), (36.7, 0.1, 280.0), (44.4, 0.1, 400.0)],
        false,
        &mut rng,
    )?;
    write_pdf(&dir.join("fit.gr"), &mut rng)?;

    let config = FigureConfig {
        cycle_pts: CYCLE_PTS,
        header_rows: HEADER_ROWS,
        current_density: Some(50.0),
        xrd_offset: 500.0,
        title: Some(Annotation {
            text: "Symmetric Li cell".to_string(),
            x: 0.0,
            y: 0.09,
        }),
        ..Default::default()
    };
    let json = serde_json::to_string_pretty(&config)?;
    fs::write(dir.join("config.json"), json).context("writing config")?;

    println!(
        "Wrote CP, EIS, XRD and PDF samples ({CYCLE_PTS} points per cycle) to {}",
        dir.display()
    );
    Ok(())
}
