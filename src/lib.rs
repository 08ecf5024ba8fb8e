//! Sum of Euler's totient over an inclusive range, computed as a two-level
//! parallel reduction and timed as the median of repeated runs.

pub mod bench;
pub mod config;
pub mod coprime;
pub mod executor;
pub mod options;
pub mod report;
pub mod totient;

pub use bench::{BenchReport, Runner};
pub use executor::{Backend, Executor, Mode, Sequential, ThreadPoolExecutor};
pub use totient::{Nesting, Schedule, TotientRange, euler, sum_totients};
