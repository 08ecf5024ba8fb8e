//! Execution substrate for chunked parallel reductions over inclusive `i64` ranges.
use serde::{Deserialize, Serialize};

mod pool;
mod sequential;

pub use pool::ThreadPoolExecutor;
pub use sequential::Sequential;

/// A capability that can run a reduction over `[lower, upper]`.
///
/// The range is cut into blocks of `chunk` consecutive iterations. Each block is
/// folded privately starting from `identity`, and block results are merged with
/// `combine`, which must be associative. The order in which blocks are merged is
/// unspecified, so only exact (integer) accumulators give reproducible results.
pub trait Executor: Sync {
    /// Number of workers a reduction may occupy.
    fn workers(&self) -> usize;

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
        C: Fn(T, T) -> T + Sync;
}

impl<E: Executor> Executor for &E {
    fn workers(&self) -> usize {
        (**self).workers()
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
        (**self).reduce(lower, upper, chunk, identity, map, combine)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[serde(alias = "seq")]
    Sequential,
    #[default]
    #[serde(alias = "par")]
    Parallel,
}

/// Runtime-selected executor.
pub enum Backend {
    Sequential(Sequential),
    Pool(ThreadPoolExecutor),
}

impl Backend {
    pub fn from_mode(
        mode: Mode,
        threads: Option<usize>,
    ) -> Result<Self, rayon::ThreadPoolBuildError> {
        match mode {
            Mode::Sequential => Ok(Backend::Sequential(Sequential)),
            Mode::Parallel => ThreadPoolExecutor::new(threads).map(Backend::Pool),
        }
    }
}

impl Executor for Backend {
    fn workers(&self) -> usize {
        match self {
            Backend::Sequential(exec) => exec.workers(),
            Backend::Pool(exec) => exec.workers(),
        }
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
        match self {
            Backend::Sequential(exec) => exec.reduce(lower, upper, chunk, identity, map, combine),
            Backend::Pool(exec) => exec.reduce(lower, upper, chunk, identity, map, combine),
        }
    }
}

/// Partition of a non-empty inclusive range into fixed-size blocks.
///
/// Block indices run over `0..=last`. Bounds are computed in `i128` so ranges
/// touching `i64::MIN` or `i64::MAX` never overflow the loop counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChunkPlan {
    lower: i64,
    upper: i64,
    chunk: u64,
    last: u64,
}

impl ChunkPlan {
    /// `None` when `lower > upper`. A chunk of 0 is treated as 1.
    pub(crate) fn new(lower: i64, upper: i64, chunk: usize) -> Option<Self> {
        if lower > upper {
            return None;
        }
        let chunk = (chunk as u64).max(1);
        Some(ChunkPlan {
            lower,
            upper,
            chunk,
            last: upper.abs_diff(lower) / chunk,
        })
    }

    pub(crate) fn last(&self) -> u64 {
        self.last
    }

    pub(crate) fn bounds(&self, index: u64) -> (i64, i64) {
        let start = self.lower as i128 + index as i128 * self.chunk as i128;
        let end = (start + self.chunk as i128 - 1).min(self.upper as i128);
        (start as i64, end as i64)
    }

    pub(crate) fn fold_chunk<T, M, C>(&self, index: u64, identity: T, map: &M, combine: &C) -> T
    where
        T: Copy,
        M: Fn(i64) -> T,
        C: Fn(T, T) -> T,
    {
        let (start, end) = self.bounds(index);
        (start..=end).fold(identity, |acc, i| combine(acc, map(i)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_range_has_no_plan() {
        assert_eq!(ChunkPlan::new(5, 4, 1), None);
        assert_eq!(ChunkPlan::new(i64::MAX, i64::MIN, 100), None);
    }

    #[test]
    fn blocks_cover_range_exactly_once() {
        let plan = ChunkPlan::new(-3, 11, 4).unwrap();
        assert_eq!(plan.last(), 3);
        let blocks: Vec<_> = (0..=plan.last()).map(|i| plan.bounds(i)).collect();
        assert_eq!(blocks, vec![(-3, 0), (1, 4), (5, 8), (9, 11)]);
    }

    #[test]
    fn single_element_range() {
        let plan = ChunkPlan::new(7, 7, 100).unwrap();
        assert_eq!(plan.last(), 0);
        assert_eq!(plan.bounds(0), (7, 7));
    }

    #[test]
    fn zero_chunk_behaves_as_one() {
        let plan = ChunkPlan::new(0, 2, 0).unwrap();
        assert_eq!(plan.last(), 2);
        assert_eq!(plan.bounds(2), (2, 2));
    }

    #[test]
    fn extreme_bounds_do_not_overflow() {
        let plan = ChunkPlan::new(i64::MAX - 2, i64::MAX, 2).unwrap();
        assert_eq!(plan.bounds(0), (i64::MAX - 2, i64::MAX - 1));
        assert_eq!(plan.bounds(1), (i64::MAX, i64::MAX));
        let count = plan.fold_chunk(1, 0u32, &|_| 1u32, &|a, b| a + b);
        assert_eq!(count, 1);

        let full = ChunkPlan::new(i64::MIN, i64::MAX, 1).unwrap();
        assert_eq!(full.last(), u64::MAX);
        assert_eq!(full.bounds(0), (i64::MIN, i64::MIN));
        assert_eq!(full.bounds(u64::MAX), (i64::MAX, i64::MAX));
    }

    #[test]
    fn backend_from_mode() {
        let seq = Backend::from_mode(Mode::Sequential, Some(8)).unwrap();
        assert_eq!(seq.workers(), 1);
        let pool = Backend::from_mode(Mode::Parallel, Some(3)).unwrap();
        assert_eq!(pool.workers(), 3);
    }

    #[test]
    fn mode_accepts_short_aliases() {
        #[derive(Deserialize)]
        struct Holder {
            mode: Mode,
        }
        let holder: Holder = toml::from_str("mode = \"seq\"").unwrap();
        assert_eq!(holder.mode, Mode::Sequential);
        let holder: Holder = toml::from_str("mode = \"parallel\"").unwrap();
        assert_eq!(holder.mode, Mode::Parallel);
    }
}
