//! Cluster-expansion strategies for the grid-L1 engine.
//!
//! All three strategies consume the same immutable [`ExpansionContext`] and
//! must produce identical partitions up to a bijective relabeling. They
//! differ in how cluster membership propagates:
//!
//! - [`sequential_expand`]: depth-first from each unlabeled core seed.
//! - [`frontier_expand`]: per-cluster breadth-first waves, each wave
//!   partitioned across workers that claim points with CAS.
//! - [`union_find_expand`]: one parallel pass merging core-core edges, then
//!   components are numbered by their minimum member index.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;

use crate::parallel::parallelize;
use crate::types::NOISE;
use crate::union_find::AtomicUnionFind;

use super::grid::CellGrid;
use super::CoordView;

/// Default chunk when splitting a frontier wave across workers.
const FRONTIER_CHUNK: usize = 64;
/// Default chunk for the parallel union pass.
const UNION_CHUNK: usize = 512;

/// Sentinel for "no component" in the union-find root tables.
const INVALID: u32 = u32::MAX;

/// Immutable view shared by all expansion strategies.
pub(crate) struct ExpansionContext<'a> {
    pub coords: CoordView<'a>,
    pub count: usize,
    pub eps: u32,
    pub grid: &'a CellGrid,
    pub is_core: &'a [u8],
    pub num_threads: usize,
    pub chunk_size: usize,
}

impl ExpansionContext<'_> {
    #[inline]
    fn is_core(&self, i: u32) -> bool {
        self.is_core[i as usize] != 0
    }
}

/// Depth-first expansion. Cluster ids are assigned in point-index order of
/// seed discovery.
pub(crate) fn sequential_expand(ctx: &ExpansionContext<'_>, labels: &mut [i32]) {
    let mut stack: Vec<u32> = Vec::with_capacity(ctx.count);
    let mut neighbor_buffer: Vec<u32> = Vec::with_capacity(64);

    let mut next_label = 0i32;
    for i in 0..ctx.count {
        if !ctx.is_core(i as u32) || labels[i] != NOISE {
            continue;
        }

        labels[i] = next_label;
        stack.clear();
        stack.push(i as u32);

        while let Some(current) = stack.pop() {
            // Collect first so label writes happen after the search; the
            // visit order within the cluster then cannot affect which
            // neighbors the grid reports.
            neighbor_buffer.clear();
            ctx.grid
                .for_each_neighbor(ctx.coords, current, ctx.eps, |neighbor| {
                    neighbor_buffer.push(neighbor);
                    true
                });

            for &neighbor in &neighbor_buffer {
                if labels[neighbor as usize] == NOISE {
                    labels[neighbor as usize] = next_label;
                    if ctx.is_core(neighbor) {
                        stack.push(neighbor);
                    }
                }
            }
        }

        next_label += 1;
    }
}

/// Breadth-first expansion parallelized within each cluster.
///
/// Seeds are taken in index order, so the sequence of cluster ids is
/// deterministic; the visit order inside a cluster is not, but every label
/// write is a CAS from `-1`, so the first claim wins and later claims are
/// no-ops.
pub(crate) fn frontier_expand(ctx: &ExpansionContext<'_>, labels: &mut [i32]) {
    let shared_labels: Vec<AtomicI32> = labels.iter().map(|&l| AtomicI32::new(l)).collect();

    let frontier_chunk = if ctx.chunk_size == 0 {
        FRONTIER_CHUNK
    } else {
        ctx.chunk_size
    };

    let mut next_label = 0i32;
    let mut frontier: Vec<u32> = Vec::with_capacity(256);

    for seed in 0..ctx.count {
        if !ctx.is_core(seed as u32)
            || shared_labels[seed].load(Ordering::Acquire) != NOISE
        {
            continue;
        }

        let label = next_label;
        next_label += 1;
        shared_labels[seed].store(label, Ordering::Release);
        frontier.clear();
        frontier.push(seed as u32);

        while !frontier.is_empty() {
            let next_frontier: Mutex<Vec<u32>> = Mutex::new(Vec::new());

            let frontier_ref = &frontier;
            let shared = &shared_labels;
            parallelize(
                0,
                frontier.len(),
                ctx.num_threads,
                frontier_chunk,
                |begin, end| {
                    let mut local_next: Vec<u32> = Vec::with_capacity(32);
                    let mut neighbor_buffer: Vec<u32> = Vec::with_capacity(64);

                    for &current in &frontier_ref[begin..end] {
                        neighbor_buffer.clear();
                        ctx.grid
                            .for_each_neighbor(ctx.coords, current, ctx.eps, |neighbor| {
                                neighbor_buffer.push(neighbor);
                                true
                            });

                        for &neighbor in &neighbor_buffer {
                            let won = shared[neighbor as usize]
                                .compare_exchange(
                                    NOISE,
                                    label,
                                    Ordering::AcqRel,
                                    Ordering::Acquire,
                                )
                                .is_ok();
                            // Only cores propagate the frontier; borders are
                            // claimed but never expanded.
                            if won && ctx.is_core(neighbor) {
                                local_next.push(neighbor);
                            }
                        }
                    }

                    if !local_next.is_empty() {
                        local_next.sort_unstable();
                        local_next.dedup();
                        next_frontier.lock().unwrap().extend_from_slice(&local_next);
                    }
                },
            );

            let mut next = next_frontier.into_inner().unwrap();
            if next.is_empty() {
                break;
            }
            next.sort_unstable();
            next.dedup();
            frontier = next;
        }
    }

    for (label, shared) in labels.iter_mut().zip(&shared_labels) {
        *label = shared.load(Ordering::Acquire);
    }
}

/// Union-find expansion.
///
/// Core-core edges are merged in one parallel pass; components are then
/// sorted by their minimum member index and numbered densely, so the
/// resulting ids do not depend on the merge schedule. Non-cores adopt the
/// smallest cluster id among their core neighbors, which keeps border
/// assignment deterministic as well.
pub(crate) fn union_find_expand(ctx: &ExpansionContext<'_>, labels: &mut [i32]) {
    let count = ctx.count;
    let uf = AtomicUnionFind::new(count);

    let union_chunk = if ctx.chunk_size == 0 {
        UNION_CHUNK
    } else {
        ctx.chunk_size
    };

    // Non-cores stay untouched singletons: only core-core edges are merged
    // and only core roots are ever queried afterwards.
    parallelize(0, count, ctx.num_threads, union_chunk, |begin, end| {
        for idx in begin..end {
            if !ctx.is_core(idx as u32) {
                continue;
            }
            ctx.grid
                .for_each_neighbor(ctx.coords, idx as u32, ctx.eps, |neighbor| {
                    if ctx.is_core(neighbor) {
                        uf.unite(idx as u32, neighbor);
                    }
                    true
                });
        }
    });

    let mut root_for_point = vec![INVALID; count];
    for i in 0..count {
        if ctx.is_core(i as u32) {
            root_for_point[i] = uf.find(i as u32);
        }
    }

    let mut component_min = vec![INVALID; count];
    for i in 0..count {
        let root = root_for_point[i];
        if root == INVALID {
            continue;
        }
        if component_min[root as usize] > i as u32 {
            component_min[root as usize] = i as u32;
        }
    }

    let mut components: Vec<(u32, u32)> = Vec::new();
    for (root, &min_index) in component_min.iter().enumerate() {
        if min_index != INVALID {
            components.push((min_index, root as u32));
        }
    }
    components.sort_unstable();

    let mut root_label = vec![NOISE; count];
    for (next_label, &(_, root)) in components.iter().enumerate() {
        root_label[root as usize] = next_label as i32;
    }

    for i in 0..count {
        let root = root_for_point[i];
        if root != INVALID {
            labels[i] = root_label[root as usize];
        }
    }

    for i in 0..count {
        if ctx.is_core(i as u32) {
            continue;
        }

        let mut best_label = NOISE;
        ctx.grid
            .for_each_neighbor(ctx.coords, i as u32, ctx.eps, |neighbor| {
                if ctx.is_core(neighbor) {
                    let candidate = labels[neighbor as usize];
                    if candidate != NOISE && (best_label == NOISE || candidate < best_label) {
                        best_label = candidate;
                    }
                }
                true
            });
        labels[i] = best_label;
    }
}
