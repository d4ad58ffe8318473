//! Uniform cell grid over non-negative integer coordinates.
//!
//! Cells are `eps`-sized squares addressed by a packed 64-bit key. Point
//! indices are sorted by `(key, index)` so each cell's occupants form a
//! contiguous run; a CSR-style offset table maps the sorted unique keys to
//! those runs. Once built, the grid is immutable and shared read-only by
//! every subsequent phase.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::parallel::parallelize;
use crate::timing::{PerfTiming, ScopedTimer};

use super::CoordView;

/// Default chunk for the parallel cell-of pass when the caller passes 0.
const INDEX_CHUNK: usize = 1024;

/// Compact 2D cell coordinates into one sortable key.
#[inline]
pub(crate) const fn pack_cell(cx: u32, cy: u32) -> u64 {
    ((cx as u64) << 32) | cy as u64
}

/// Immutable spatial index for one clustering run.
pub(crate) struct CellGrid {
    cell_x: Vec<u32>,
    cell_y: Vec<u32>,
    /// Point indices permuted so identical cells are contiguous, ascending
    /// index within each cell.
    ordered_indices: Vec<u32>,
    /// Distinct packed keys, strictly increasing.
    unique_keys: Vec<u64>,
    /// Run boundaries into `ordered_indices`; last entry equals the count.
    cell_offsets: Vec<usize>,
}

impl CellGrid {
    /// Build the grid in three timed passes: cell-of (parallel), index sort,
    /// offset scan.
    pub(crate) fn build(
        coords: CoordView<'_>,
        count: usize,
        eps: u32,
        num_threads: usize,
        chunk_size: usize,
        timing: &mut PerfTiming,
    ) -> Self {
        let cell_size = eps;

        let cell_x_shared: Vec<AtomicU32> = (0..count).map(|_| AtomicU32::new(0)).collect();
        let cell_y_shared: Vec<AtomicU32> = (0..count).map(|_| AtomicU32::new(0)).collect();
        let keys_shared: Vec<AtomicU64> = (0..count).map(|_| AtomicU64::new(0)).collect();

        let index_chunk = if chunk_size == 0 { INDEX_CHUNK } else { chunk_size };
        {
            let _t = ScopedTimer::new("precompute_cells", timing);
            parallelize(0, count, num_threads, index_chunk, |begin, end| {
                for i in begin..end {
                    let cx = coords.x(i as u32) / cell_size;
                    let cy = coords.y(i as u32) / cell_size;
                    cell_x_shared[i].store(cx, Ordering::Relaxed);
                    cell_y_shared[i].store(cy, Ordering::Relaxed);
                    keys_shared[i].store(pack_cell(cx, cy), Ordering::Relaxed);
                }
            });
        }
        let cell_x: Vec<u32> = cell_x_shared.into_iter().map(AtomicU32::into_inner).collect();
        let cell_y: Vec<u32> = cell_y_shared.into_iter().map(AtomicU32::into_inner).collect();
        let keys: Vec<u64> = keys_shared.into_iter().map(AtomicU64::into_inner).collect();

        let mut ordered_indices: Vec<u32> = (0..count as u32).collect();
        {
            let _t = ScopedTimer::new("sort_indices", timing);
            ordered_indices.sort_unstable_by_key(|&i| (keys[i as usize], i));
        }

        let mut unique_keys = Vec::new();
        let mut cell_offsets = Vec::new();
        {
            let _t = ScopedTimer::new("build_cell_offsets", timing);
            let mut pos = 0;
            while pos < count {
                let key = keys[ordered_indices[pos] as usize];
                unique_keys.push(key);
                cell_offsets.push(pos);
                loop {
                    pos += 1;
                    if pos >= count || keys[ordered_indices[pos] as usize] != key {
                        break;
                    }
                }
            }
            cell_offsets.push(count);
        }

        Self {
            cell_x,
            cell_y,
            ordered_indices,
            unique_keys,
            cell_offsets,
        }
    }

    /// Visit every point within L1 distance `eps` of `point_index`,
    /// scanning the 3×3 block of cells around it. Emits the point itself.
    ///
    /// The callback returns `false` to stop the whole iteration early.
    #[inline]
    pub(crate) fn for_each_neighbor<F>(
        &self,
        coords: CoordView<'_>,
        point_index: u32,
        eps: u32,
        mut f: F,
    ) where
        F: FnMut(u32) -> bool,
    {
        let base_cx = self.cell_x[point_index as usize] as i64;
        let base_cy = self.cell_y[point_index as usize] as i64;
        let x_a = coords.x(point_index);
        let y_a = coords.y(point_index);

        for dx in -1i64..=1 {
            let nx = base_cx + dx;
            if nx < 0 || nx > u32::MAX as i64 {
                continue;
            }
            for dy in -1i64..=1 {
                let ny = base_cy + dy;
                if ny < 0 || ny > u32::MAX as i64 {
                    continue;
                }

                let key = pack_cell(nx as u32, ny as u32);
                let Ok(cell_idx) = self.unique_keys.binary_search(&key) else {
                    continue;
                };

                let begin = self.cell_offsets[cell_idx];
                let end = self.cell_offsets[cell_idx + 1];
                for &neighbor in &self.ordered_indices[begin..end] {
                    let dx_abs = x_a.abs_diff(coords.x(neighbor)) as u64;
                    let dy_abs = y_a.abs_diff(coords.y(neighbor)) as u64;
                    if dx_abs + dy_abs <= eps as u64 {
                        if !f(neighbor) {
                            return;
                        }
                    }
                }
            }
        }
    }
}
