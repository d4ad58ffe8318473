#![allow(dead_code)]

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use dbscan2d::Point;

/// Well-separated float blobs: cluster centers are spaced far apart
/// relative to `spread`, so border assignment is unambiguous and every
/// engine must produce the same partition.
pub fn clustered_points_f64(
    n_clusters: usize,
    per_cluster: usize,
    spread: f64,
    seed: u64,
) -> Vec<Point<f64>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut points = Vec::with_capacity(n_clusters * per_cluster);

    for c in 0..n_clusters {
        let center_x = c as f64 * spread * 100.0;
        let center_y = c as f64 * spread * 50.0;
        for _ in 0..per_cluster {
            points.push(Point::new(
                center_x + rng.gen_range(-spread..spread),
                center_y + rng.gen_range(-spread..spread),
            ));
        }
    }

    points
}

/// Well-separated integer blobs for the grid-L1 engine.
pub fn clustered_grid_coords(
    n_clusters: usize,
    per_cluster: usize,
    seed: u64,
) -> (Vec<u32>, Vec<u32>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut x = Vec::with_capacity(n_clusters * per_cluster);
    let mut y = Vec::with_capacity(n_clusters * per_cluster);

    for c in 0..n_clusters {
        let center_x = 1_000 + c as u32 * 500;
        let center_y = 2_000 + c as u32 * 400;
        for _ in 0..per_cluster {
            x.push(center_x + rng.gen_range(0..40));
            y.push(center_y + rng.gen_range(0..40));
        }
    }

    (x, y)
}

/// Uniformly scattered integer coordinates; produces a mix of small
/// clusters and noise depending on eps.
pub fn uniform_grid_coords(n: usize, max: u32, seed: u64) -> (Vec<u32>, Vec<u32>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let x = (0..n).map(|_| rng.gen_range(0..max)).collect();
    let y = (0..n).map(|_| rng.gen_range(0..max)).collect();
    (x, y)
}

/// Integer points on one horizontal line. With all y equal, Manhattan and
/// Euclidean distances coincide, so the L1 and L2 engines are directly
/// comparable on this data.
pub fn collinear_grid_coords(n: usize, seed: u64) -> (Vec<u32>, Vec<u32>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let x = (0..n).map(|_| rng.gen_range(0..5_000)).collect();
    let y = vec![1_000; n];
    (x, y)
}

/// Interleave separate x/y vectors into float points.
pub fn to_f64_points(x: &[u32], y: &[u32]) -> Vec<Point<f64>> {
    x.iter()
        .zip(y)
        .map(|(&px, &py)| Point::new(px as f64, py as f64))
        .collect()
}
