//! Euler totient (by trial coprimality) and its sum over an inclusive range.
use serde::{Deserialize, Serialize};

use crate::coprime::relprime;
use crate::executor::{Executor, Sequential};

/// Iterations handed to a worker at a time inside a single totient.
pub const INNER_CHUNK: usize = 100;
/// Totients handed to a worker at a time across the range.
pub const OUTER_CHUNK: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub outer_chunk: usize,
    pub inner_chunk: usize,
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule {
            outer_chunk: OUTER_CHUNK,
            inner_chunk: INNER_CHUNK,
        }
    }
}

/// Where the reduction inside each totient runs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nesting {
    /// Dispatched to the same executor as the range reduction.
    #[default]
    Shared,
    /// Run inline on the worker that owns the totient.
    Flattened,
}

/// Count of `i` in `[1, n - 1]` coprime to `n`.
///
/// Note that `euler(1) == 0`, and any `n < 1` is an empty count.
pub fn euler<E: Executor>(exec: &E, n: i64, chunk: usize) -> i64 {
    if n <= 1 {
        return 0;
    }
    exec.reduce(1, n - 1, chunk, 0, |i| i64::from(relprime(n, i)), |a, b| a + b)
}

/// Two-level reduction: the range is reduced over totients, and each totient
/// is itself a reduction placed according to [`Nesting`].
pub struct TotientRange<E> {
    exec: E,
    schedule: Schedule,
    nesting: Nesting,
}

impl<E: Executor> TotientRange<E> {
    pub fn new(exec: E, schedule: Schedule, nesting: Nesting) -> Self {
        TotientRange {
            exec,
            schedule,
            nesting,
        }
    }

    pub fn totient(&self, n: i64) -> i64 {
        match self.nesting {
            Nesting::Shared => euler(&self.exec, n, self.schedule.inner_chunk),
            Nesting::Flattened => euler(&Sequential, n, self.schedule.inner_chunk),
        }
    }

    /// Sum of totients over `[lower, upper]`; 0 when `lower > upper`.
    ///
    /// The sum wraps on `i64` overflow.
    pub fn sum(&self, lower: i64, upper: i64) -> i64 {
        self.exec.reduce(
            lower,
            upper,
            self.schedule.outer_chunk,
            0,
            |i| self.totient(i),
            i64::wrapping_add,
        )
    }
}

/// Sum of totients with the default schedule and shared nesting.
pub fn sum_totients<E: Executor>(exec: E, lower: i64, upper: i64) -> i64 {
    TotientRange::new(exec, Schedule::default(), Nesting::default()).sum(lower, upper)
}
