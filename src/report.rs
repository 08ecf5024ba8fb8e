//! Console and JSON rendering of a benchmark report.
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use thiserror::Error;

use crate::bench::BenchReport;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Sum of Totients between [{}..{}] is {}",
            self.lower, self.upper, self.sum
        )?;
        writeln!(f, "Median Time Taken: {:.6} s", self.median_secs)
    }
}

pub fn to_json_string(report: &BenchReport) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn write_json<P: AsRef<Path>>(path: P, report: &BenchReport) -> Result<(), ReportError> {
    let mut file = File::create(path)?;
    let content = to_json_string(report)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
