use super::{ChunkPlan, Executor};

/// Folds every block in order on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sequential;

impl Executor for Sequential {
    fn workers(&self) -> usize {
        1
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
        (0..=plan.last()).fold(identity, |acc, index| {
            combine(acc, plan.fold_chunk(index, identity, &map, &combine))
        })
    }
}
