//! Worker-local thread pool the numerical kernels partition column/row
//! ranges across (spec §5: "disjoint writes, no locking needed within a
//! kernel call"). Grounded on the teacher's `search::parallel::ThreadPool`
//! fan-out/join shape (`pool->partition(...)->waitSubmit()`), rebuilt on
//! `std::thread::scope` instead of the teacher's persistent
//! crossbeam-channel workers: every kernel call here closes over
//! caller-local slices by reference (`gradient.rs`/`dual.rs`'s raw-pointer
//! partitions), and routing a borrowed closure through a long-lived
//! channel would need the job type to be `'static`.

use std::thread;

/// A thread-pool handle sized once at construction and reused for every
/// kernel call (spec §4.4-§4.6's "partition the column/row range across
/// threads"). Threads themselves are spawned per call, scoped to that
/// call's lifetime; only the configured width is persistent.
pub struct KernelPool {
    num_threads: usize,
}

impl KernelPool {
    pub fn new(num_threads: usize) -> Self {
        debug_assert!(num_threads > 0, "num_threads must be at least 1 (spec §7)");
        Self { num_threads }
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Run `f(range)` once per contiguous chunk of `0..n`, split as evenly
    /// as possible across the pool, and block until every chunk finishes.
    /// `f` must be safe to call concurrently from multiple chunks with
    /// disjoint output ranges (spec §5).
    pub fn parallel_for<F>(&self, n: usize, f: F)
    where
        F: Fn(std::ops::Range<usize>) + Send + Sync,
    {
        if n == 0 {
            return;
        }
        let threads = self.num_threads.min(n);
        let chunk = n.div_ceil(threads);
        let f = &f;
        thread::scope(|scope| {
            for t in 0..threads {
                let start = t * chunk;
                let end = (start + chunk).min(n);
                if start >= end {
                    continue;
                }
                scope.spawn(move || f(start..end));
            }
        });
    }
}
