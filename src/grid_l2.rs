//! Grid-accelerated DBSCAN under the Euclidean metric.
//!
//! A uniform grid with cell extent `eps` restricts every neighborhood test
//! to a 3×3 block of cells. Core detection, core-core merging, labeling and
//! border adoption all run as parallel phases over static splits; the
//! cluster topology is resolved by the lock-free [`AtomicUnionFind`], whose
//! smaller-root-wins rule makes the surviving representatives independent
//! of the thread schedule.

use std::sync::atomic::{AtomicI32, AtomicU8, Ordering};

use rustc_hash::FxHashMap;

use crate::error::DbscanError;
use crate::parallel::parallel_for;
use crate::types::{ClusterResult, Point, Scalar, NOISE};
use crate::union_find::AtomicUnionFind;

/// Grid-accelerated L2 clusterer.
#[derive(Debug, Clone, Copy)]
pub struct DbscanGrid<T> {
    eps: T,
    min_samples: u32,
    num_threads: usize,
}

/// Uniform grid over the input's bounding box, cell extent `eps`.
///
/// Occupants are stored contiguously per cell (count, prefix-sum, scatter),
/// ascending by point index within each cell.
struct Grid {
    cells_x: usize,
    cells_y: usize,
    cell_of_point: Vec<u32>,
    cell_offsets: Vec<u32>,
    occupants: Vec<u32>,
}

impl Grid {
    fn build<T: Scalar>(points: &[Point<T>], eps: T) -> Self {
        let mut min_x = points[0].x;
        let mut min_y = points[0].y;
        let mut max_x = points[0].x;
        let mut max_y = points[0].y;
        for p in &points[1..] {
            if p.x < min_x {
                min_x = p.x;
            }
            if p.x > max_x {
                max_x = p.x;
            }
            if p.y < min_y {
                min_y = p.y;
            }
            if p.y > max_y {
                max_y = p.y;
            }
        }

        let cells_x = ((max_x - min_x) / eps).trunc_usize() + 1;
        let cells_y = ((max_y - min_y) / eps).trunc_usize() + 1;
        let num_cells = cells_x * cells_y;

        let mut cell_of_point = Vec::with_capacity(points.len());
        let mut cell_counts = vec![0u32; num_cells];
        for p in points {
            let cx = ((p.x - min_x) / eps).trunc_usize();
            let cy = ((p.y - min_y) / eps).trunc_usize();
            let cell = cx + cy * cells_x;
            cell_of_point.push(cell as u32);
            cell_counts[cell] += 1;
        }

        let mut cell_offsets = Vec::with_capacity(num_cells + 1);
        cell_offsets.push(0u32);
        let mut sum = 0u32;
        for &count in &cell_counts {
            sum += count;
            cell_offsets.push(sum);
        }

        let mut occupants = vec![0u32; points.len()];
        let mut cursors = cell_offsets[..num_cells].to_vec();
        for (i, &cell) in cell_of_point.iter().enumerate() {
            let pos = cursors[cell as usize];
            occupants[pos as usize] = i as u32;
            cursors[cell as usize] = pos + 1;
        }

        Self {
            cells_x,
            cells_y,
            cell_of_point,
            cell_offsets,
            occupants,
        }
    }

    /// Visit every point in the 3×3 cell block around point `i`, in cell
    /// scan order and ascending index within each cell. Emits `i` itself.
    #[inline]
    fn for_each_candidate(&self, i: usize, mut f: impl FnMut(u32)) {
        // Decode with the grid's actual width.
        let cell = self.cell_of_point[i] as usize;
        let cx = cell % self.cells_x;
        let cy = cell / self.cells_x;

        for dy in -1i64..=1 {
            let ny = cy as i64 + dy;
            if ny < 0 || ny >= self.cells_y as i64 {
                continue;
            }
            for dx in -1i64..=1 {
                let nx = cx as i64 + dx;
                if nx < 0 || nx >= self.cells_x as i64 {
                    continue;
                }
                let neighbor_cell = nx as usize + ny as usize * self.cells_x;
                let begin = self.cell_offsets[neighbor_cell] as usize;
                let end = self.cell_offsets[neighbor_cell + 1] as usize;
                for &candidate in &self.occupants[begin..end] {
                    f(candidate);
                }
            }
        }
    }
}

impl<T: Scalar> DbscanGrid<T> {
    /// Create a clusterer. Parameters follow [`crate::Dbscan::new`].
    pub fn new(eps: T, min_samples: u32) -> Result<Self, DbscanError> {
        if !(eps > T::ZERO) {
            return Err(DbscanError::InvalidEps);
        }
        if min_samples == 0 {
            return Err(DbscanError::InvalidMinSamples);
        }
        Ok(Self {
            eps,
            min_samples,
            num_threads: 0,
        })
    }

    /// Override the worker count; 0 means hardware concurrency.
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    /// Cluster `points`, returning dense labels.
    pub fn cluster(&self, points: &[Point<T>]) -> ClusterResult {
        let n = points.len();
        if n == 0 {
            return ClusterResult::empty();
        }

        let eps_sq = self.eps * self.eps;
        let grid = Grid::build(points, self.eps);

        // Core detection: a point is core when its closed ε-neighborhood,
        // itself included, reaches min_samples.
        let core_flags: Vec<AtomicU8> = (0..n).map(|_| AtomicU8::new(0)).collect();
        parallel_for(0, n, self.num_threads, |begin, end| {
            for i in begin..end {
                let mut neighbor_count = 0u32;
                grid.for_each_candidate(i, |j| {
                    if points[j as usize].dist_sq(points[i]) <= eps_sq {
                        neighbor_count += 1;
                    }
                });
                if neighbor_count >= self.min_samples {
                    core_flags[i].store(1, Ordering::Relaxed);
                }
            }
        });
        let is_core: Vec<u8> = core_flags.into_iter().map(AtomicU8::into_inner).collect();

        // Merge every core-core pair within eps.
        let uf = AtomicUnionFind::new(n);
        parallel_for(0, n, self.num_threads, |begin, end| {
            for i in begin..end {
                if is_core[i] == 0 {
                    continue;
                }
                grid.for_each_candidate(i, |j| {
                    if j as usize != i
                        && is_core[j as usize] != 0
                        && points[j as usize].dist_sq(points[i]) <= eps_sq
                    {
                        uf.unite(i as u32, j);
                    }
                });
            }
        });

        // Core labeling: each core takes its component root.
        let cluster_ids: Vec<AtomicI32> = (0..n).map(|_| AtomicI32::new(NOISE)).collect();
        parallel_for(0, n, self.num_threads, |begin, end| {
            for i in begin..end {
                if is_core[i] != 0 {
                    cluster_ids[i].store(uf.find(i as u32) as i32, Ordering::Relaxed);
                }
            }
        });

        // Border adoption: first in-range core in candidate order wins.
        // Core ids were fully written in the previous phase, so the loads
        // here never race with a store to the same slot.
        parallel_for(0, n, self.num_threads, |begin, end| {
            for i in begin..end {
                if is_core[i] != 0 {
                    continue;
                }
                let mut adopted = NOISE;
                grid.for_each_candidate(i, |j| {
                    if adopted == NOISE
                        && is_core[j as usize] != 0
                        && points[j as usize].dist_sq(points[i]) <= eps_sq
                    {
                        adopted = cluster_ids[j as usize].load(Ordering::Relaxed);
                    }
                });
                if adopted != NOISE {
                    cluster_ids[i].store(adopted, Ordering::Relaxed);
                }
            }
        });

        // Remap union-find roots to dense ids in first-appearance order.
        let raw: Vec<i32> = cluster_ids.into_iter().map(AtomicI32::into_inner).collect();
        let mut remap: FxHashMap<i32, i32> = FxHashMap::default();
        let mut labels = Vec::with_capacity(n);
        for &id in &raw {
            if id == NOISE {
                labels.push(NOISE);
                continue;
            }
            let next = remap.len() as i32;
            labels.push(*remap.entry(id).or_insert(next));
        }

        ClusterResult {
            num_clusters: remap.len() as i32,
            labels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point<f64>> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(matches!(
            DbscanGrid::new(0.0f64, 2),
            Err(DbscanError::InvalidEps)
        ));
        assert!(matches!(
            DbscanGrid::new(1.0f64, 0),
            Err(DbscanError::InvalidMinSamples)
        ));
    }

    #[test]
    fn test_empty_input() {
        let result = DbscanGrid::new(0.5f64, 2).unwrap().cluster(&[]);
        assert!(result.labels.is_empty());
        assert_eq!(result.num_clusters, 0);
    }

    #[test]
    fn test_two_clusters_and_noise() {
        let points = pts(&[
            (0.0, 0.0),
            (0.1, 0.1),
            (0.2, 0.2),
            (5.0, 5.0),
            (5.1, 5.1),
            (5.2, 5.2),
            (10.0, 10.0),
        ]);
        let result = DbscanGrid::new(0.5f64, 2).unwrap().cluster(&points);

        assert_eq!(result.num_clusters, 2);
        assert_eq!(result.labels[0], result.labels[1]);
        assert_eq!(result.labels[1], result.labels[2]);
        assert_eq!(result.labels[3], result.labels[4]);
        assert_eq!(result.labels[4], result.labels[5]);
        assert_ne!(result.labels[0], result.labels[3]);
        assert_eq!(result.labels[6], NOISE);
    }

    #[test]
    fn test_labels_are_dense() {
        let points = pts(&[
            (0.0, 0.0),
            (0.1, 0.0),
            (50.0, 50.0),
            (50.1, 50.0),
            (100.0, 0.0),
            (100.1, 0.0),
        ]);
        let result = DbscanGrid::new(0.5f64, 2).unwrap().cluster(&points);

        assert_eq!(result.num_clusters, 3);
        for &label in &result.labels {
            assert!((0..3).contains(&label));
        }
    }

    #[test]
    fn test_cluster_spanning_many_cells() {
        // A chain of core points crossing cell boundaries must collapse to
        // a single cluster through transitive merges.
        let points: Vec<Point<f64>> = (0..40).map(|i| Point::new(i as f64 * 0.9, 0.0)).collect();
        let result = DbscanGrid::new(1.0f64, 2).unwrap().cluster(&points);
        assert_eq!(result.num_clusters, 1);
        assert!(result.labels.iter().all(|&l| l == 0));
    }

    #[test]
    fn test_single_threaded_matches_default() {
        let points: Vec<Point<f64>> = (0..60)
            .map(|i| Point::new((i % 10) as f64 * 0.2, (i / 10) as f64 * 0.2))
            .collect();
        let a = DbscanGrid::new(0.5f64, 3).unwrap().cluster(&points);
        let b = DbscanGrid::new(0.5f64, 3)
            .unwrap()
            .with_num_threads(1)
            .cluster(&points);
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.num_clusters, b.num_clusters);
    }

    #[test]
    fn test_negative_coordinates() {
        let points = pts(&[(-5.0, -5.0), (-5.1, -5.1), (-5.2, -5.2), (7.0, 7.0)]);
        let result = DbscanGrid::new(0.5f64, 2).unwrap().cluster(&points);
        assert_eq!(result.num_clusters, 1);
        assert_eq!(result.labels[3], NOISE);
    }
}
