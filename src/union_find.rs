//! Lock-free disjoint-set over point indices.
//!
//! Parents live in a flat array of atomics; `unite` merges roots with a
//! single compare-exchange and `find` compresses the traversed chain. When
//! two roots merge, the numerically smaller index always wins, so the
//! representative of each component at quiescence is determined solely by
//! the edge set, independent of thread schedule.

use std::sync::atomic::{AtomicU32, Ordering};

/// Concurrent union-find with path compression and smaller-root-wins merges.
pub struct AtomicUnionFind {
    parent: Vec<AtomicU32>,
}

impl AtomicUnionFind {
    /// Create `n` singleton sets, `parent[i] == i`.
    pub fn new(n: usize) -> Self {
        debug_assert!(n <= u32::MAX as usize, "element count exceeds u32 index space");
        Self {
            parent: (0..n as u32).map(AtomicU32::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of the set containing `i`.
    ///
    /// Walks to the fixed point, then points every traversed node at the
    /// root. A lost compare-exchange during compression just leaves a
    /// slightly longer chain for a later call to shorten; it never breaks
    /// the structure.
    pub fn find(&self, i: u32) -> u32 {
        let mut root = i;
        loop {
            let p = self.parent[root as usize].load(Ordering::Relaxed);
            if p == root {
                break;
            }
            root = p;
        }

        let mut node = i;
        while node != root {
            let next = self.parent[node as usize].load(Ordering::Relaxed);
            if next == root {
                break;
            }
            let _ = self.parent[node as usize].compare_exchange_weak(
                next,
                root,
                Ordering::Relaxed,
                Ordering::Relaxed,
            );
            node = next;
        }

        root
    }

    /// Merge the sets containing `i` and `j`.
    ///
    /// The smaller of the two roots becomes the parent of the larger. On a
    /// lost race the whole operation retries from fresh `find`s.
    pub fn unite(&self, i: u32, j: u32) {
        loop {
            let a = self.find(i);
            let b = self.find(j);
            if a == b {
                return;
            }

            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            if self.parent[hi as usize]
                .compare_exchange(hi, lo, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_initialization() {
        let uf = AtomicUnionFind::new(10);
        assert_eq!(uf.len(), 10);
        for i in 0..10 {
            assert_eq!(uf.find(i), i);
        }
    }

    #[test]
    fn test_simple_unite() {
        let uf = AtomicUnionFind::new(10);
        uf.unite(0, 1);
        assert_eq!(uf.find(0), uf.find(1));

        uf.unite(2, 3);
        assert_eq!(uf.find(2), uf.find(3));
        assert_ne!(uf.find(0), uf.find(2));
    }

    #[test]
    fn test_chain_unite_root_is_minimum() {
        let uf = AtomicUnionFind::new(10);
        uf.unite(3, 2);
        uf.unite(2, 1);
        uf.unite(1, 0);

        for i in 0..4 {
            assert_eq!(uf.find(i), 0, "smaller index must win the merge");
        }
    }

    #[test]
    fn test_uniting_already_united_sets() {
        let uf = AtomicUnionFind::new(5);
        uf.unite(0, 1);
        uf.unite(2, 3);
        uf.unite(0, 3);

        let root = uf.find(0);
        for i in 0..4 {
            assert_eq!(uf.find(i), root);
        }

        uf.unite(1, 2);
        assert_eq!(uf.find(1), root);
        assert_eq!(uf.find(2), root);
    }

    #[test]
    fn test_self_unite_is_noop() {
        let uf = AtomicUnionFind::new(5);
        uf.unite(2, 2);
        assert_eq!(uf.find(2), 2);
    }

    #[test]
    fn test_partition_matches_connected_components() {
        // Edges form components {0,1,2}, {3,4}, {5}.
        let uf = AtomicUnionFind::new(6);
        uf.unite(0, 1);
        uf.unite(1, 2);
        uf.unite(3, 4);

        assert_eq!(uf.find(0), 0);
        assert_eq!(uf.find(1), 0);
        assert_eq!(uf.find(2), 0);
        assert_eq!(uf.find(3), 3);
        assert_eq!(uf.find(4), 3);
        assert_eq!(uf.find(5), 5);
    }

    #[test]
    fn test_long_chain_compresses() {
        let n = 10_000u32;
        let uf = AtomicUnionFind::new(n as usize);
        for i in 0..n - 1 {
            uf.unite(i, i + 1);
        }
        for i in 0..n {
            assert_eq!(uf.find(i), 0);
        }
    }

    #[test]
    fn test_concurrent_disjoint_unites() {
        let n = 1000;
        let num_threads = 16;
        let uf = AtomicUnionFind::new(n);

        thread::scope(|scope| {
            for t in 0..num_threads {
                let uf = &uf;
                scope.spawn(move || {
                    for i in (t..n / 2).step_by(num_threads) {
                        uf.unite(2 * i as u32, 2 * i as u32 + 1);
                    }
                });
            }
        });

        for i in 0..n / 2 {
            assert_eq!(uf.find(2 * i as u32), uf.find(2 * i as u32 + 1));
            if i > 0 {
                assert_ne!(uf.find(2 * i as u32), uf.find(2 * (i - 1) as u32));
            }
        }
    }

    #[test]
    fn test_concurrent_high_contention_single_root() {
        let n = 1000u32;
        let num_threads = 16;
        let uf = AtomicUnionFind::new(n as usize);

        thread::scope(|scope| {
            for t in 0..num_threads {
                let uf = &uf;
                scope.spawn(move || {
                    for i in ((t + 1)..n as usize).step_by(num_threads) {
                        uf.unite(0, i as u32);
                    }
                });
            }
        });

        for i in 1..n {
            assert_eq!(uf.find(i), 0);
        }
    }

    #[test]
    fn test_concurrent_even_odd_stress() {
        // All threads unite evens with 0 and odds with 1. High contention
        // with a predictable final state: exactly two components.
        let n = 2000u32;
        let num_threads = thread::available_parallelism().map_or(4, |p| p.get());
        let uf = AtomicUnionFind::new(n as usize);

        thread::scope(|scope| {
            for t in 0..num_threads {
                let uf = &uf;
                scope.spawn(move || {
                    for i in (t..n as usize).step_by(num_threads) {
                        if i > 1 {
                            if i % 2 == 0 {
                                uf.unite(0, i as u32);
                            } else {
                                uf.unite(1, i as u32);
                            }
                        }
                    }
                });
            }
        });

        let even_root = uf.find(0);
        let odd_root = uf.find(1);
        assert_ne!(even_root, odd_root);

        for i in 0..n {
            if i % 2 == 0 {
                assert_eq!(uf.find(i), even_root);
            } else {
                assert_eq!(uf.find(i), odd_root);
            }
        }
    }

    #[test]
    fn test_single_and_two_elements() {
        let uf = AtomicUnionFind::new(1);
        assert_eq!(uf.find(0), 0);

        let uf = AtomicUnionFind::new(2);
        uf.unite(0, 1);
        assert_eq!(uf.find(0), uf.find(1));
    }
}
