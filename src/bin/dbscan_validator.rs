//! Dataset validator: runs selected engines against a reference labeling
//! and reports partition agreement.
//!
//! Exit code 0 iff every selected engine reproduces the truth exactly
//! (ARI 1.0, zero mismatched points after the majority remap).

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, ValueEnum};

use dbscan2d::io::{read_labels_i32, read_points_yx_u32};
use dbscan2d::validation::{count_clusters, count_noise, evaluate, EvaluationReport};
use dbscan2d::{dbscan_grid2d_l1, Dbscan, DbscanGrid, ExpansionMode, GridL1Params, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ImplChoice {
    /// All-pairs L2 baseline only.
    Baseline,
    /// Grid-accelerated L2 engine only.
    Optimized,
    /// Grid L1 engine only.
    #[value(alias = "grid_l1")]
    Grid,
    /// Baseline and optimized.
    Both,
    /// Every engine.
    All,
}

#[derive(Debug, Parser)]
#[command(
    name = "dbscan_validator",
    about = "Validate DBSCAN engines against a reference labeling"
)]
struct Args {
    /// Point data file: raw (y, x) little-endian u32 pairs.
    #[arg(long, default_value = "data.bin")]
    data: PathBuf,

    /// Truth label file: raw little-endian i32 labels.
    #[arg(long, default_value = "truth.bin")]
    truth: PathBuf,

    /// Neighborhood radius.
    #[arg(long, default_value_t = 60.0)]
    eps: f64,

    /// Density threshold, counting the point itself.
    #[arg(long = "min-samples", default_value_t = 16)]
    min_samples: u32,

    /// Which engines to run.
    #[arg(long = "impl", value_enum, default_value_t = ImplChoice::Both)]
    implementation: ImplChoice,

    /// Directory for per-engine mismatch index dumps.
    #[arg(long = "dump-mismatches")]
    dump_mismatches: Option<PathBuf>,
}

struct RunResult {
    name: &'static str,
    report: EvaluationReport,
}

fn dump_mismatches(
    dir: &PathBuf,
    engine: &str,
    mismatches: &[usize],
) -> Result<(), Box<dyn std::error::Error>> {
    if mismatches.is_empty() {
        return Ok(());
    }
    fs::create_dir_all(dir)?;
    let file_path = dir.join(format!("{engine}_mismatches.txt"));
    let mut out = String::with_capacity(mismatches.len() * 8);
    for index in mismatches {
        out.push_str(&index.to_string());
        out.push('\n');
    }
    fs::write(&file_path, out)?;
    println!(
        "[{engine}] Wrote {} mismatches to {}",
        mismatches.len(),
        file_path.display()
    );
    Ok(())
}

fn run(args: &Args) -> Result<bool, Box<dyn std::error::Error>> {
    if args.eps <= 0.0 {
        return Err("--eps must be positive".into());
    }
    if args.min_samples == 0 {
        return Err("--min-samples must be positive".into());
    }

    let (run_baseline, run_optimized, run_grid_l1) = match args.implementation {
        ImplChoice::Baseline => (true, false, false),
        ImplChoice::Optimized => (false, true, false),
        ImplChoice::Grid => (false, false, true),
        ImplChoice::Both => (true, true, false),
        ImplChoice::All => (true, true, true),
    };

    let (x_coords, y_coords) = read_points_yx_u32(&args.data)
        .map_err(|e| format!("failed to read data file: {e}"))?;
    let truth_labels = read_labels_i32(&args.truth)
        .map_err(|e| format!("failed to read truth file: {e}"))?;

    if x_coords.len() != truth_labels.len() {
        return Err(format!(
            "point count ({}) and truth label count ({}) differ",
            x_coords.len(),
            truth_labels.len()
        )
        .into());
    }

    let points: Vec<Point<f64>> = x_coords
        .iter()
        .zip(&y_coords)
        .map(|(&x, &y)| Point::new(x as f64, y as f64))
        .collect();

    println!("Loaded {} points from {}", points.len(), args.data.display());
    println!("Using eps={}, min_samples={}", args.eps, args.min_samples);
    println!(
        "Ground truth clusters: {}; noise points: {}",
        count_clusters(&truth_labels),
        count_noise(&truth_labels)
    );

    let mut results: Vec<RunResult> = Vec::with_capacity(3);
    let want_mismatches = args.dump_mismatches.is_some();

    if run_baseline {
        print!("\n[baseline] Running clustering...");
        let _ = std::io::stdout().flush();
        let start = Instant::now();
        let clustering = Dbscan::new(args.eps, args.min_samples)?.cluster(&points);
        let mut mismatches = Vec::new();
        let report = evaluate(
            &clustering.labels,
            &truth_labels,
            want_mismatches.then_some(&mut mismatches),
        );
        println!(" done in {} ms", start.elapsed().as_millis());
        results.push(RunResult {
            name: "baseline",
            report,
        });
        if let Some(dir) = &args.dump_mismatches {
            dump_mismatches(dir, "baseline", &mismatches)?;
        }
    }

    if run_optimized {
        print!("\n[optimized] Running clustering...");
        let _ = std::io::stdout().flush();
        let start = Instant::now();
        let clustering = DbscanGrid::new(args.eps, args.min_samples)?.cluster(&points);
        let mut mismatches = Vec::new();
        let report = evaluate(
            &clustering.labels,
            &truth_labels,
            want_mismatches.then_some(&mut mismatches),
        );
        println!(" done in {} ms", start.elapsed().as_millis());
        results.push(RunResult {
            name: "optimized",
            report,
        });
        if let Some(dir) = &args.dump_mismatches {
            dump_mismatches(dir, "optimized", &mismatches)?;
        }
    }

    if run_grid_l1 {
        let eps_int = args.eps.round() as u32;
        if (args.eps - eps_int as f64).abs() > 1e-6 {
            return Err("grid implementation requires an integer eps value".into());
        }

        print!("\n[grid_l1] Running clustering...");
        let _ = std::io::stdout().flush();
        let start = Instant::now();
        let params = GridL1Params::new(eps_int, args.min_samples);
        let result = dbscan_grid2d_l1(
            &x_coords,
            1,
            &y_coords,
            1,
            x_coords.len(),
            &params,
            ExpansionMode::Sequential,
        )?;
        let mut mismatches = Vec::new();
        let report = evaluate(
            &result.labels,
            &truth_labels,
            want_mismatches.then_some(&mut mismatches),
        );
        println!(" done in {} ms", start.elapsed().as_millis());
        results.push(RunResult {
            name: "grid_l1",
            report,
        });
        if let Some(dir) = &args.dump_mismatches {
            dump_mismatches(dir, "grid_l1", &mismatches)?;
        }
    }

    let mut all_passed = true;
    for result in &results {
        let r = &result.report;
        println!("\nImplementation: {}", result.name);
        println!(
            "  clusters: {} (truth {})",
            r.predicted_clusters, r.truth_clusters
        );
        println!(
            "  noise points: {} (truth {})",
            r.predicted_noise, r.truth_noise
        );
        println!("  adjusted rand index: {:.6}", r.adjusted_rand);
        println!("  remapped accuracy: {:.6}%", r.remapped_accuracy * 100.0);
        println!("  mismatched points: {}", r.mismatched_points);
        println!("  status: {}", if r.passed() { "PASS" } else { "FAIL" });
        all_passed &= r.passed();
    }

    Ok(all_passed)
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
