//! Cross-engine equivalence: for identical inputs, every engine and every
//! expansion mode must produce the same partition up to a bijective
//! relabeling, which is exactly an adjusted Rand index of 1.0.

mod support;

use dbscan2d::validation::adjusted_rand_index;
use dbscan2d::{
    dbscan_grid2d_l1, Dbscan, DbscanGrid, ExpansionMode, GridL1Params, NOISE,
};
use support::points::{
    clustered_grid_coords, clustered_points_f64, collinear_grid_coords, to_f64_points,
    uniform_grid_coords,
};

const ALL_MODES: [ExpansionMode; 3] = [
    ExpansionMode::Sequential,
    ExpansionMode::FrontierParallel,
    ExpansionMode::UnionFind,
];

fn l1_labels(x: &[u32], y: &[u32], params: &GridL1Params, mode: ExpansionMode) -> Vec<i32> {
    dbscan_grid2d_l1(x, 1, y, 1, x.len(), params, mode)
        .unwrap()
        .labels
}

#[test]
fn test_l1_expansion_modes_agree_on_clustered_data() {
    for seed in [2, 71, 901] {
        let (x, y) = clustered_grid_coords(6, 120, seed);
        let params = GridL1Params::new(8, 4);

        let reference = l1_labels(&x, &y, &params, ExpansionMode::Sequential);
        for mode in ALL_MODES {
            let labels = l1_labels(&x, &y, &params, mode);
            assert_eq!(
                adjusted_rand_index(&labels, &reference),
                1.0,
                "seed {seed}, mode {mode:?} disagrees with sequential"
            );
        }
    }
}

#[test]
fn test_l1_expansion_modes_agree_on_uniform_data() {
    // Scattered data produces a ragged mix of small clusters and noise,
    // which exercises border handling much harder than clean blobs.
    for seed in [13, 509] {
        let (x, y) = uniform_grid_coords(600, 2_500, seed);
        let params = GridL1Params::new(70, 3);

        let reference = l1_labels(&x, &y, &params, ExpansionMode::Sequential);
        for mode in [ExpansionMode::FrontierParallel, ExpansionMode::UnionFind] {
            let labels = l1_labels(&x, &y, &params, mode);
            assert_eq!(
                adjusted_rand_index(&labels, &reference),
                1.0,
                "seed {seed}, mode {mode:?} disagrees with sequential"
            );
        }
    }
}

#[test]
fn test_l1_modes_agree_across_thread_and_chunk_settings() {
    let (x, y) = clustered_grid_coords(4, 150, 77);
    let reference = l1_labels(&x, &y, &GridL1Params::new(8, 4), ExpansionMode::Sequential);

    for threads in [1, 2, 8] {
        for chunk in [0, 1, 33] {
            let mut params = GridL1Params::new(8, 4);
            params.num_threads = threads;
            params.chunk_size = chunk;
            for mode in ALL_MODES {
                let labels = l1_labels(&x, &y, &params, mode);
                assert_eq!(
                    adjusted_rand_index(&labels, &reference),
                    1.0,
                    "threads={threads} chunk={chunk} mode={mode:?}"
                );
            }
        }
    }
}

#[test]
fn test_sequential_mode_is_deterministic() {
    let (x, y) = uniform_grid_coords(400, 2_000, 19);
    let params = GridL1Params::new(60, 3);

    let first = l1_labels(&x, &y, &params, ExpansionMode::Sequential);
    for _ in 0..3 {
        assert_eq!(l1_labels(&x, &y, &params, ExpansionMode::Sequential), first);
    }
}

#[test]
fn test_union_find_mode_is_deterministic_across_runs() {
    // Component numbering is anchored to minimum member indices, so even
    // the parallel union-find must reproduce byte-identical labels.
    let (x, y) = uniform_grid_coords(500, 2_200, 37);
    let mut params = GridL1Params::new(65, 3);
    params.num_threads = 8;

    let first = l1_labels(&x, &y, &params, ExpansionMode::UnionFind);
    for _ in 0..3 {
        assert_eq!(l1_labels(&x, &y, &params, ExpansionMode::UnionFind), first);
    }
}

#[test]
fn test_baseline_and_grid_l2_agree() {
    // With min_samples 3 a border point near two clusters is impossible
    // (two core neighbors would make it core), so the partitions must
    // match exactly, not merely up to border tie-breaks.
    for seed in [5, 111] {
        let points = clustered_points_f64(5, 100, 3.0, seed);
        let baseline = Dbscan::new(1.5, 3).unwrap().cluster(&points);
        let grid = DbscanGrid::new(1.5, 3).unwrap().cluster(&points);

        assert_eq!(
            adjusted_rand_index(&grid.labels, &baseline.labels),
            1.0,
            "seed {seed}: grid-L2 disagrees with baseline"
        );
        assert_eq!(baseline.num_clusters, grid.num_clusters);
    }
}

#[test]
fn test_all_engines_agree_on_collinear_integer_data() {
    // On a single horizontal line the L1 and L2 metrics coincide, so the
    // Manhattan engine is directly comparable with the Euclidean ones.
    for seed in [29, 83] {
        let (x, y) = collinear_grid_coords(300, seed);
        let points = to_f64_points(&x, &y);
        let eps = 7u32;
        let min_samples = 3u32;

        let baseline = Dbscan::new(eps as f64, min_samples).unwrap().cluster(&points);
        let grid_l2 = DbscanGrid::new(eps as f64, min_samples)
            .unwrap()
            .cluster(&points);

        assert_eq!(
            adjusted_rand_index(&grid_l2.labels, &baseline.labels),
            1.0,
            "seed {seed}: grid-L2 vs baseline"
        );

        let params = GridL1Params::new(eps, min_samples);
        for mode in ALL_MODES {
            let labels = l1_labels(&x, &y, &params, mode);
            assert_eq!(
                adjusted_rand_index(&labels, &baseline.labels),
                1.0,
                "seed {seed}, mode {mode:?} vs baseline"
            );
        }
    }
}

#[test]
fn test_noise_sets_are_identical_across_modes() {
    let (x, y) = uniform_grid_coords(500, 2_500, 61);
    let params = GridL1Params::new(60, 4);

    let noise_of = |mode| -> Vec<bool> {
        l1_labels(&x, &y, &params, mode)
            .iter()
            .map(|&l| l == NOISE)
            .collect()
    };

    let reference = noise_of(ExpansionMode::Sequential);
    assert_eq!(noise_of(ExpansionMode::FrontierParallel), reference);
    assert_eq!(noise_of(ExpansionMode::UnionFind), reference);
}
