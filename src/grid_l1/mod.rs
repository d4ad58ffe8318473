//! Grid-accelerated DBSCAN under the Manhattan metric.
//!
//! Specialized for non-negative `u32` coordinates: cell indices come
//! straight from integer division by `eps`, with no bounding-box
//! normalization. Inputs arrive either as two strided coordinate slices
//! (SoA) or as a packed point array (AoS); the AoS entry point is a
//! zero-copy wrapper over the SoA one.
//!
//! Each call runs precompute → sort → offsets → core detection → expansion,
//! with every phase recorded in the returned [`PerfTiming`].

mod expand;
mod grid;

use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::DbscanError;
use crate::parallel::parallelize;
use crate::timing::{PerfTiming, ScopedTimer, Timer};
use crate::types::{GridPoint, NOISE};

use expand::{frontier_expand, sequential_expand, union_find_expand, ExpansionContext};
use grid::CellGrid;

/// Default chunk for the parallel core-detection pass.
const CORE_CHUNK: usize = 512;

/// How a cluster grows from its core points. The set is closed; callers
/// pick a strategy per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpansionMode {
    /// Single-threaded depth-first expansion.
    #[default]
    Sequential,
    /// Breadth-first waves parallelized within each cluster.
    FrontierParallel,
    /// Lock-free union-find over core-core edges.
    UnionFind,
}

/// Parameters for a grid-L1 run.
///
/// `num_threads == 0` means hardware concurrency; `chunk_size == 0` lets
/// each phase pick its own default.
#[derive(Debug, Clone, Copy)]
pub struct GridL1Params {
    pub eps: u32,
    pub min_samples: u32,
    pub num_threads: usize,
    pub chunk_size: usize,
}

impl GridL1Params {
    pub fn new(eps: u32, min_samples: u32) -> Self {
        Self {
            eps,
            min_samples,
            num_threads: 0,
            chunk_size: 0,
        }
    }
}

/// Labels plus per-phase timings for one grid-L1 run.
#[derive(Debug, Clone)]
pub struct GridL1Result {
    pub labels: Vec<i32>,
    pub perf_timing: PerfTiming,
}

/// Strided view over the two coordinate axes.
#[derive(Clone, Copy)]
pub(crate) struct CoordView<'a> {
    x: &'a [u32],
    x_stride: usize,
    y: &'a [u32],
    y_stride: usize,
}

impl<'a> CoordView<'a> {
    pub(crate) fn new(x: &'a [u32], x_stride: usize, y: &'a [u32], y_stride: usize) -> Self {
        Self {
            x,
            x_stride,
            y,
            y_stride,
        }
    }

    #[inline]
    pub(crate) fn x(&self, i: u32) -> u32 {
        self.x[i as usize * self.x_stride]
    }

    #[inline]
    pub(crate) fn y(&self, i: u32) -> u32 {
        self.y[i as usize * self.y_stride]
    }
}

fn validate_axis(
    axis: &'static str,
    coords: &[u32],
    stride: usize,
    count: usize,
) -> Result<(), DbscanError> {
    if stride == 0 {
        return Err(DbscanError::InvalidStride { axis });
    }
    let needed = (count - 1) * stride + 1;
    if coords.len() < needed {
        return Err(DbscanError::CoordinatesTooShort {
            axis,
            needed,
            len: coords.len(),
        });
    }
    Ok(())
}

/// Cluster strided SoA coordinates under the L1 metric.
///
/// `x[i * x_stride]` and `y[i * y_stride]` are the coordinates of point
/// `i`; both slices must cover `count` points. Returns one label per point
/// plus phase timings.
pub fn dbscan_grid2d_l1(
    x: &[u32],
    x_stride: usize,
    y: &[u32],
    y_stride: usize,
    count: usize,
    params: &GridL1Params,
    mode: ExpansionMode,
) -> Result<GridL1Result, DbscanError> {
    if params.eps == 0 {
        return Err(DbscanError::InvalidEps);
    }
    if params.min_samples == 0 {
        return Err(DbscanError::InvalidMinSamples);
    }

    if count == 0 {
        return Ok(GridL1Result {
            labels: Vec::new(),
            perf_timing: PerfTiming::new(),
        });
    }

    validate_axis("x", x, x_stride, count)?;
    validate_axis("y", y, y_stride, count)?;

    let coords = CoordView::new(x, x_stride, y, y_stride);
    let mut timing = PerfTiming::new();
    let total = Timer::start();

    let grid = CellGrid::build(
        coords,
        count,
        params.eps,
        params.num_threads,
        params.chunk_size,
        &mut timing,
    );

    let is_core = {
        let _t = ScopedTimer::new("core_detection", &mut timing);
        detect_cores(coords, count, &grid, params)
    };

    let mut labels = vec![NOISE; count];
    {
        let _t = ScopedTimer::new("cluster_expansion", &mut timing);
        let ctx = ExpansionContext {
            coords,
            count,
            eps: params.eps,
            grid: &grid,
            is_core: &is_core,
            num_threads: params.num_threads,
            chunk_size: params.chunk_size,
        };
        match mode {
            ExpansionMode::Sequential => sequential_expand(&ctx, &mut labels),
            ExpansionMode::FrontierParallel => frontier_expand(&ctx, &mut labels),
            ExpansionMode::UnionFind => union_find_expand(&ctx, &mut labels),
        }
    }

    timing.add("total", total.elapsed_ms());

    Ok(GridL1Result {
        labels,
        perf_timing: timing,
    })
}

/// Cluster a packed `(x, y)` point array under the L1 metric.
///
/// Delegates to [`dbscan_grid2d_l1`] by viewing the array as interleaved
/// coordinates with stride 2; no copy is made.
pub fn dbscan_grid2d_l1_aos(
    points: &[GridPoint],
    params: &GridL1Params,
    mode: ExpansionMode,
) -> Result<GridL1Result, DbscanError> {
    if points.is_empty() {
        return dbscan_grid2d_l1(&[], 1, &[], 1, 0, params, mode);
    }

    let flat: &[u32] = bytemuck::cast_slice(points);
    dbscan_grid2d_l1(flat, 2, &flat[1..], 2, points.len(), params, mode)
}

/// Mark every point whose closed ε-neighborhood (self included) reaches
/// `min_samples`. The neighbor scan stops counting as soon as the threshold
/// is met.
fn detect_cores(
    coords: CoordView<'_>,
    count: usize,
    grid: &CellGrid,
    params: &GridL1Params,
) -> Vec<u8> {
    let core_chunk = if params.chunk_size == 0 {
        CORE_CHUNK
    } else {
        params.chunk_size
    };

    let flags: Vec<AtomicU8> = (0..count).map(|_| AtomicU8::new(0)).collect();
    parallelize(0, count, params.num_threads, core_chunk, |begin, end| {
        for idx in begin..end {
            let mut neighbor_count = 0u32;
            grid.for_each_neighbor(coords, idx as u32, params.eps, |_| {
                neighbor_count += 1;
                neighbor_count < params.min_samples
            });
            if neighbor_count >= params.min_samples {
                flags[idx].store(1, Ordering::Relaxed);
            }
        }
    });

    flags.into_iter().map(AtomicU8::into_inner).collect()
}
