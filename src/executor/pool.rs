use std::num::NonZeroUsize;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

use super::{ChunkPlan, Executor};

/// Work-stealing pool; blocks are claimed on demand by idle workers.
///
/// A reduction started from inside one of this pool's workers runs on the same
/// pool, so nested reductions share workers instead of spawning new threads.
pub struct ThreadPoolExecutor {
    pool: ThreadPool,
}

impl ThreadPoolExecutor {
    /// `None` sizes the pool from `std::thread::available_parallelism`.
    ///
    /// `Some(0)` is passed through to rayon, which then picks its own size
    /// (`RAYON_NUM_THREADS` or the CPU count). `BenchConfig::validate` rejects a
    /// configured thread count of 0 before a pool is ever built.
    pub fn new(threads: Option<usize>) -> Result<Self, ThreadPoolBuildError> {
        let threads = threads.unwrap_or_else(default_parallelism);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("totient-worker-{index}"))
            .build()?;
        log::debug!("worker pool started with {} threads", pool.current_num_threads());
        Ok(ThreadPoolExecutor { pool })
    }
}

pub(crate) fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

impl Executor for ThreadPoolExecutor {
    fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn reduce<T, M, C>(
        &self,
        lower: i64,
        upper: i64,
        chunk: usize,
        identity: T,
        map: M,
        combine: C,
    ) -> T
    where
        T: Copy + Send + Sync,
        M: Fn(i64) -> T + Sync,
        C: Fn(T, T) -> T + Sync,
    {
        let Some(plan) = ChunkPlan::new(lower, upper, chunk) else {
            return identity;
        };
        let (map, combine) = (&map, &combine);
        self.pool.install(move || {
            (0..=plan.last())
                .into_par_iter()
                .map(move |index| plan.fold_chunk(index, identity, map, combine))
                .reduce(move || identity, combine)
        })
    }
}
