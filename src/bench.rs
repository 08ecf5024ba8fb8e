//! Repeated timed runs of a totient range sum and the median of their durations.
use std::hint::black_box;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;

use crate::executor::Executor;
use crate::totient::TotientRange;

pub const DEFAULT_NUM_RUNS: usize = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BenchError {
    #[error("run count must be at least 1")]
    NoRuns,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunMeasurement {
    pub seconds: f64,
    pub sum: i64,
}

/// Measurements in the order the runs executed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RunSet {
    measurements: Vec<RunMeasurement>,
}

impl RunSet {
    pub fn with_capacity(runs: usize) -> Self {
        RunSet {
            measurements: Vec::with_capacity(runs),
        }
    }

    pub fn push(&mut self, measurement: RunMeasurement) {
        self.measurements.push(measurement);
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn measurements(&self) -> &[RunMeasurement] {
        &self.measurements
    }

    pub fn sorted_seconds(&self) -> Vec<f64> {
        let mut seconds: Vec<f64> = self.measurements.iter().map(|m| m.seconds).collect();
        seconds.sort_by(f64::total_cmp);
        seconds
    }

    /// Element `len / 2` of the ascending durations.
    ///
    /// With an even count this picks the upper of the two middle values; the
    /// two are never averaged.
    pub fn median_seconds(&self) -> Option<f64> {
        median_of_sorted(&self.sorted_seconds())
    }

    pub fn fastest(&self) -> Option<f64> {
        self.sorted_seconds().first().copied()
    }

    pub fn slowest(&self) -> Option<f64> {
        self.sorted_seconds().last().copied()
    }

    pub fn last_sum(&self) -> Option<i64> {
        self.measurements.last().map(|m| m.sum)
    }

    pub fn sums_agree(&self) -> bool {
        self.measurements.windows(2).all(|w| w[0].sum == w[1].sum)
    }
}

impl FromIterator<RunMeasurement> for RunSet {
    fn from_iter<I: IntoIterator<Item = RunMeasurement>>(iter: I) -> Self {
        RunSet {
            measurements: iter.into_iter().collect(),
        }
    }
}

pub fn median_of_sorted(sorted: &[f64]) -> Option<f64> {
    sorted.get(sorted.len() / 2).copied()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchReport {
    pub lower: i64,
    pub upper: i64,
    pub sum: i64,
    pub median_secs: f64,
    pub runs: RunSet,
}

pub struct Runner<E> {
    range: TotientRange<E>,
}

impl<E: Executor> Runner<E> {
    pub fn new(range: TotientRange<E>) -> Self {
        Runner { range }
    }

    pub fn run_once(&self, lower: i64, upper: i64) -> RunMeasurement {
        let start = Instant::now();
        let sum = black_box(self.range.sum(black_box(lower), black_box(upper)));
        let seconds = start.elapsed().as_secs_f64();
        RunMeasurement { seconds, sum }
    }

    /// Runs the sum `runs` times back to back and reports the median duration.
    ///
    /// The reported sum is the one from the last run.
    pub fn run_n(&self, lower: i64, upper: i64, runs: usize) -> Result<BenchReport, BenchError> {
        if runs == 0 {
            return Err(BenchError::NoRuns);
        }

        let mut set = RunSet::with_capacity(runs);
        for run in 0..runs {
            let measurement = self.run_once(lower, upper);
            log::debug!(
                "run {}/{}: sum {} in {:.6} s",
                run + 1,
                runs,
                measurement.sum,
                measurement.seconds
            );
            set.push(measurement);
        }

        if !set.sums_agree() {
            log::warn!(
                "sums differ between runs over [{}..{}]: {:?}",
                lower,
                upper,
                set.measurements().iter().map(|m| m.sum).collect::<Vec<_>>()
            );
        }

        let sum = set.last_sum().ok_or(BenchError::NoRuns)?;
        let median_secs = set.median_seconds().ok_or(BenchError::NoRuns)?;
        Ok(BenchReport {
            lower,
            upper,
            sum,
            median_secs,
            runs: set,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{Sequential, ThreadPoolExecutor};
    use crate::totient::{Nesting, Schedule};

    fn set_of(seconds: &[f64]) -> RunSet {
        seconds
            .iter()
            .map(|&seconds| RunMeasurement { seconds, sum: 0 })
            .collect()
    }

    #[test]
    fn median_of_five_is_middle() {
        let set = set_of(&[0.5, 0.1, 0.4, 0.2, 0.3]);
        assert_eq!(set.sorted_seconds(), vec![0.1, 0.2, 0.3, 0.4, 0.5]);
        assert_eq!(set.median_seconds(), Some(0.3));
    }

    #[test]
    fn median_of_four_takes_index_two() {
        let set = set_of(&[0.4, 0.1, 0.3, 0.2]);
        assert_eq!(set.median_seconds(), Some(0.3));
    }

    #[test]
    fn median_of_one_and_two() {
        assert_eq!(set_of(&[0.7]).median_seconds(), Some(0.7));
        assert_eq!(set_of(&[0.9, 0.2]).median_seconds(), Some(0.9));
        assert_eq!(RunSet::default().median_seconds(), None);
    }

    #[test]
    fn extremes() {
        let set = set_of(&[0.3, 0.1, 0.2]);
        assert_eq!(set.fastest(), Some(0.1));
        assert_eq!(set.slowest(), Some(0.3));
    }

    #[test]
    fn sums_agree_detects_mismatch() {
        let mut set = RunSet::default();
        assert!(set.sums_agree());
        set.push(RunMeasurement { seconds: 0.1, sum: 31 });
        set.push(RunMeasurement { seconds: 0.2, sum: 31 });
        assert!(set.sums_agree());
        set.push(RunMeasurement { seconds: 0.3, sum: 30 });
        assert!(!set.sums_agree());
        assert_eq!(set.last_sum(), Some(30));
    }

    #[test]
    fn zero_runs_is_an_error() {
        let runner = Runner::new(TotientRange::new(
            Sequential,
            Schedule::default(),
            Nesting::default(),
        ));
        assert_eq!(runner.run_n(1, 10, 0), Err(BenchError::NoRuns));
    }

    #[test]
    fn every_run_reports_the_same_sum() {
        let pool = ThreadPoolExecutor::new(Some(4)).unwrap();
        let runner = Runner::new(TotientRange::new(
            pool,
            Schedule::default(),
            Nesting::Shared,
        ));
        let report = runner.run_n(1, 10, DEFAULT_NUM_RUNS).unwrap();
        assert_eq!(report.sum, 31);
        assert_eq!(report.runs.len(), DEFAULT_NUM_RUNS);
        assert!(report.runs.sums_agree());
        assert!(report.runs.measurements().iter().all(|m| m.sum == 31));
        assert!(report.median_secs >= 0.0);
        assert_eq!(report.runs.median_seconds(), Some(report.median_secs));
    }

    #[test]
    fn empty_range_benchmark() {
        let runner = Runner::new(TotientRange::new(
            Sequential,
            Schedule::default(),
            Nesting::Flattened,
        ));
        let report = runner.run_n(20, 10, 3).unwrap();
        assert_eq!(report.sum, 0);
        assert_eq!(report.runs.len(), 3);
    }
}
