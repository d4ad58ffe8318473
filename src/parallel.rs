//! Scoped worker-pool primitives for the parallel clustering phases.
//!
//! Two dispatch modes share the callback signature `fn(begin, end)`:
//!
//! - [`parallel_for`]: static split into equal contiguous chunks, one worker
//!   per non-empty chunk.
//! - [`parallelize`]: dynamic steal off an atomic cursor; workers pull
//!   fixed-size chunks until the range is drained.
//!
//! Every index in `[begin, end)` is handed to exactly one callback
//! invocation, and all workers are joined before either function returns.
//! Callbacks must be safe to run concurrently on non-overlapping ranges.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

/// Resolve a requested thread count; 0 means hardware concurrency, min 1.
fn resolve_threads(requested: usize) -> usize {
    if requested != 0 {
        return requested;
    }
    thread::available_parallelism().map_or(1, |n| n.get())
}

/// Run `body` over `[begin, end)` split into `num_threads` equal chunks.
///
/// The last chunk absorbs the remainder. `num_threads == 0` uses hardware
/// concurrency. Empty ranges return without spawning.
pub fn parallel_for<F>(begin: usize, end: usize, num_threads: usize, body: F)
where
    F: Fn(usize, usize) + Sync,
{
    if begin >= end {
        return;
    }

    let threads = resolve_threads(num_threads);
    let total = end - begin;
    let chunk = total.div_ceil(threads);

    thread::scope(|scope| {
        for t in 0..threads {
            let chunk_begin = begin + t * chunk;
            if chunk_begin >= end {
                break;
            }
            let chunk_end = end.min(chunk_begin + chunk);
            let body = &body;
            scope.spawn(move || body(chunk_begin, chunk_end));
        }
    });
}

/// Run `body` over `[begin, end)` with dynamic chunk stealing.
///
/// Workers repeatedly claim the next `chunk_size` indices from a shared
/// atomic cursor until the range is exhausted. `chunk_size == 0` defaults to
/// `ceil(len / num_threads)`.
pub fn parallelize<F>(begin: usize, end: usize, num_threads: usize, chunk_size: usize, body: F)
where
    F: Fn(usize, usize) + Sync,
{
    if begin >= end {
        return;
    }

    let threads = resolve_threads(num_threads);
    let chunk = if chunk_size == 0 {
        (end - begin).div_ceil(threads).max(1)
    } else {
        chunk_size
    };

    let cursor = AtomicUsize::new(begin);

    thread::scope(|scope| {
        for _ in 0..threads {
            let cursor = &cursor;
            let body = &body;
            scope.spawn(move || loop {
                let start = cursor.fetch_add(chunk, Ordering::Relaxed);
                if start >= end {
                    break;
                }
                body(start, end.min(start + chunk));
            });
        }
    });
}
