//! Benchmark the clustering engines at configurable scales.
//!
//! Run with: cargo run --release --bin bench_dbscan
//!
//! Usage:
//!   bench_dbscan                  Run default sizes
//!   bench_dbscan -n 100k 500k    Run specific sizes
//!   bench_dbscan --skip-baseline  Grid engines only (baseline is O(n²))

use clap::Parser;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

use dbscan2d::{
    dbscan_grid2d_l1, Dbscan, DbscanGrid, ExpansionMode, GridL1Params, GridL1Result, Point,
};

fn parse_count(s: &str) -> Result<usize, String> {
    let s = s.to_lowercase();
    let (num_str, multiplier) = if let Some(stripped) = s.strip_suffix('m') {
        (stripped, 1_000_000)
    } else if let Some(stripped) = s.strip_suffix('k') {
        (stripped, 1_000)
    } else {
        (s.as_str(), 1)
    };

    num_str
        .parse::<f64>()
        .map(|n| (n * multiplier as f64) as usize)
        .map_err(|e| format!("invalid count '{s}': {e}"))
}

#[derive(Debug, Parser)]
#[command(name = "bench_dbscan", about = "Benchmark the DBSCAN engines")]
struct Args {
    /// Dataset sizes, e.g. 10k 100k 1m.
    #[arg(short = 'n', long = "sizes", value_parser = parse_count, num_args = 1.., default_values = ["10k", "100k"])]
    sizes: Vec<usize>,

    /// Number of clusters to synthesize.
    #[arg(long, default_value_t = 8)]
    clusters: usize,

    /// Neighborhood radius (integer so all engines can run).
    #[arg(long, default_value_t = 60)]
    eps: u32,

    /// Density threshold, counting the point itself.
    #[arg(long = "min-samples", default_value_t = 16)]
    min_samples: u32,

    /// Worker threads; 0 = hardware concurrency.
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// RNG seed for dataset synthesis.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Skip the O(n²) baseline (slow beyond ~50k points).
    #[arg(long)]
    skip_baseline: bool,
}

/// Synthesize clustered u32 points: dense blobs on a diagonal plus a band
/// of uniform noise.
fn generate_dataset(n_points: usize, n_clusters: usize, seed: u64) -> (Vec<u32>, Vec<u32>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut x = Vec::with_capacity(n_points);
    let mut y = Vec::with_capacity(n_points);

    let per_cluster = n_points * 9 / 10 / n_clusters.max(1);
    for c in 0..n_clusters {
        let center_x = 5_000 + c as u32 * 2_000;
        let center_y = 5_000 + c as u32 * 2_000;
        for _ in 0..per_cluster {
            x.push(center_x + rng.gen_range(0..100));
            y.push(center_y + rng.gen_range(0..100));
        }
    }

    while x.len() < n_points {
        x.push(rng.gen_range(0..40_000));
        y.push(rng.gen_range(0..40_000));
    }

    (x, y)
}

fn report_l1(name: &str, result: &GridL1Result, wall_ms: f64) {
    let clusters = dbscan2d::validation::count_clusters(&result.labels);
    let noise = dbscan2d::validation::count_noise(&result.labels);
    println!("  {name:<22} {wall_ms:9.1} ms   clusters={clusters} noise={noise}");
    for entry in result.perf_timing.entries() {
        println!("    {:<20} {:9.2} ms", entry.label, entry.duration_ms);
    }
}

fn main() {
    let args = Args::parse();

    for &n in &args.sizes {
        println!("\n=== {} points ===", n);
        let (x, y) = generate_dataset(n, args.clusters, args.seed);
        let points: Vec<Point<f64>> = x
            .iter()
            .zip(&y)
            .map(|(&px, &py)| Point::new(px as f64, py as f64))
            .collect();

        if !args.skip_baseline {
            let algo = Dbscan::new(args.eps as f64, args.min_samples)
                .expect("benchmark parameters are valid");
            let start = Instant::now();
            let result = algo.cluster(&points);
            println!(
                "  {:<22} {:9.1} ms   clusters={}",
                "baseline",
                start.elapsed().as_secs_f64() * 1000.0,
                result.num_clusters
            );
        }

        let algo = DbscanGrid::new(args.eps as f64, args.min_samples)
            .expect("benchmark parameters are valid")
            .with_num_threads(args.threads);
        let start = Instant::now();
        let result = algo.cluster(&points);
        println!(
            "  {:<22} {:9.1} ms   clusters={}",
            "grid_l2",
            start.elapsed().as_secs_f64() * 1000.0,
            result.num_clusters
        );

        let mut params = GridL1Params::new(args.eps, args.min_samples);
        params.num_threads = args.threads;
        for (name, mode) in [
            ("grid_l1/sequential", ExpansionMode::Sequential),
            ("grid_l1/frontier", ExpansionMode::FrontierParallel),
            ("grid_l1/union_find", ExpansionMode::UnionFind),
        ] {
            let start = Instant::now();
            let result = dbscan_grid2d_l1(&x, 1, &y, 1, x.len(), &params, mode)
                .expect("benchmark parameters are valid");
            report_l1(name, &result, start.elapsed().as_secs_f64() * 1000.0);
        }
    }
}
