//! Partition comparison for clustering results.
//!
//! Provides the adjusted Rand index and a majority-vote label remapping,
//! used by the dataset validator and by cross-engine equivalence tests.
//! Labels are compared as partitions: two label vectors agree when one is a
//! bijective relabeling of the other, which is exactly ARI == 1.0.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::types::NOISE;

/// Metrics comparing a predicted labeling against a reference labeling.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    /// Chance-corrected partition agreement; 1.0 means identical up to
    /// relabeling.
    pub adjusted_rand: f64,
    /// Fraction of points matching the truth after the majority remap.
    pub remapped_accuracy: f64,
    /// Points still mismatched after the majority remap.
    pub mismatched_points: usize,
    pub predicted_clusters: usize,
    pub truth_clusters: usize,
    pub predicted_noise: usize,
    pub truth_noise: usize,
}

impl EvaluationReport {
    /// A run passes when every point matches after remapping and the
    /// cluster counts agree.
    pub fn passed(&self) -> bool {
        self.mismatched_points == 0 && self.predicted_clusters == self.truth_clusters
    }
}

/// Number of distinct non-noise labels.
pub fn count_clusters(labels: &[i32]) -> usize {
    let mut clusters = FxHashSet::default();
    for &label in labels {
        if label != NOISE {
            clusters.insert(label);
        }
    }
    clusters.len()
}

/// Number of noise points.
pub fn count_noise(labels: &[i32]) -> usize {
    labels.iter().filter(|&&l| l == NOISE).count()
}

/// Distinct labels in first-appearance order, with a reverse index.
struct LabelIndex {
    to_index: FxHashMap<i32, usize>,
    values: Vec<i32>,
}

fn make_index(labels: &[i32]) -> LabelIndex {
    let mut index = LabelIndex {
        to_index: FxHashMap::default(),
        values: Vec::new(),
    };
    for &label in labels {
        if !index.to_index.contains_key(&label) {
            index.to_index.insert(label, index.values.len());
            index.values.push(label);
        }
    }
    index
}

fn combination2(n: i64) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    n as f64 * (n - 1) as f64 / 2.0
}

/// Adjusted Rand index between two labelings of the same points.
///
/// Noise is treated as an ordinary label, so two results only score 1.0
/// when they agree on which points are noise.
pub fn adjusted_rand_index(predicted: &[i32], truth: &[i32]) -> f64 {
    evaluate(predicted, truth, None).adjusted_rand
}

/// Full comparison of `predicted` against `truth`.
///
/// When `mismatch_indices` is provided it receives the indices of points
/// that disagree with the truth after each predicted cluster is remapped to
/// the truth label it most overlaps.
///
/// Panics if the two slices differ in length; callers validate that before
/// running any engine.
pub fn evaluate(
    predicted: &[i32],
    truth: &[i32],
    mut mismatch_indices: Option<&mut Vec<usize>>,
) -> EvaluationReport {
    assert_eq!(
        predicted.len(),
        truth.len(),
        "predicted and truth labelings must have the same length"
    );

    let total_points = truth.len();
    let predicted_index = make_index(predicted);
    let truth_index = make_index(truth);

    let predicted_size = predicted_index.values.len();
    let truth_size = truth_index.values.len();

    let mut contingency = vec![0i64; predicted_size * truth_size];
    let mut predicted_counts = vec![0i64; predicted_size];
    let mut truth_counts = vec![0i64; truth_size];

    for i in 0..total_points {
        let row = predicted_index.to_index[&predicted[i]];
        let col = truth_index.to_index[&truth[i]];
        contingency[row * truth_size + col] += 1;
        predicted_counts[row] += 1;
        truth_counts[col] += 1;
    }

    let sum_combination: f64 = contingency.iter().map(|&c| combination2(c)).sum();
    let predicted_combination: f64 = predicted_counts.iter().map(|&c| combination2(c)).sum();
    let truth_combination: f64 = truth_counts.iter().map(|&c| combination2(c)).sum();

    let total_pairs = combination2(total_points as i64);
    let expected_index = if total_pairs > 0.0 {
        predicted_combination * truth_combination / total_pairs
    } else {
        0.0
    };
    let max_index = 0.5 * (predicted_combination + truth_combination);
    let denominator = max_index - expected_index;

    let adjusted_rand = if denominator == 0.0 {
        1.0
    } else {
        (sum_combination - expected_index) / denominator
    };

    // Majority remap: each predicted cluster maps to the truth label it
    // shares the most points with; noise always maps to noise.
    let mut remap: FxHashMap<i32, i32> = FxHashMap::default();
    for (row, &predicted_label) in predicted_index.values.iter().enumerate() {
        if predicted_label == NOISE {
            remap.insert(NOISE, NOISE);
            continue;
        }
        let row_slice = &contingency[row * truth_size..(row + 1) * truth_size];
        let mut best_col = 0;
        let mut best_count = -1i64;
        for (col, &count) in row_slice.iter().enumerate() {
            if count > best_count {
                best_count = count;
                best_col = col;
            }
        }
        remap.insert(predicted_label, truth_index.values[best_col]);
    }

    if let Some(indices) = mismatch_indices.as_mut() {
        indices.clear();
    }

    let mut matches = 0usize;
    for i in 0..total_points {
        let mapped = remap[&predicted[i]];
        if mapped == truth[i] {
            matches += 1;
        } else if let Some(indices) = mismatch_indices.as_mut() {
            indices.push(i);
        }
    }

    EvaluationReport {
        adjusted_rand,
        remapped_accuracy: if total_points == 0 {
            1.0
        } else {
            matches as f64 / total_points as f64
        },
        mismatched_points: total_points - matches,
        predicted_clusters: count_clusters(predicted),
        truth_clusters: count_clusters(truth),
        predicted_noise: count_noise(predicted),
        truth_noise: count_noise(truth),
    }
}
