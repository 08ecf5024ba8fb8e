use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::bench::DEFAULT_NUM_RUNS;
use crate::executor::Mode;
use crate::options::Options;
use crate::totient::{INNER_CHUNK, Nesting, OUTER_CHUNK, Schedule};

pub const NUM_RUNS_ENV: &str = "NUM_RUNS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("NUM_RUNS must be a positive integer, got {0:?}")]
    InvalidRunCount(String),
    #[error("run count must be at least 1")]
    ZeroRuns,
    #[error("{0} must be at least 1")]
    ZeroChunk(&'static str),
    #[error("thread count must be at least 1")]
    ZeroThreads,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BenchConfig {
    #[serde(default = "default_runs")]
    pub runs: usize,
    /// `None` sizes the pool from the hardware.
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub nesting: Nesting,
    #[serde(default = "default_outer_chunk")]
    pub outer_chunk: usize,
    #[serde(default = "default_inner_chunk")]
    pub inner_chunk: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            runs: default_runs(),
            threads: None,
            mode: Mode::default(),
            nesting: Nesting::default(),
            outer_chunk: default_outer_chunk(),
            inner_chunk: default_inner_chunk(),
        }
    }
}

impl BenchConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: BenchConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Like [`BenchConfig::load_from_file`], but a missing file is an error.
    pub fn load_required<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            bail!("Config file not found: {:?}", path);
        }
        Self::load_from_file(path)
    }

    /// Layers defaults, then `file`, then the raw `NUM_RUNS` value, then the
    /// flags in `options`, and validates the result.
    pub fn resolve(
        file: Option<&Path>,
        num_runs: Option<&str>,
        options: &Options,
    ) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::load_required(path)?,
            None => Self::default(),
        };
        config.apply_num_runs(num_runs)?;
        options.apply_to(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Overrides `runs` from a raw `NUM_RUNS` value. Unset or blank leaves it alone.
    pub fn apply_num_runs(&mut self, raw: Option<&str>) -> Result<(), ConfigError> {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(());
        };
        match raw.parse::<usize>() {
            Ok(0) | Err(_) => Err(ConfigError::InvalidRunCount(raw.to_string())),
            Ok(runs) => {
                self.runs = runs;
                Ok(())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runs == 0 {
            return Err(ConfigError::ZeroRuns);
        }
        if self.threads == Some(0) {
            return Err(ConfigError::ZeroThreads);
        }
        if self.outer_chunk == 0 {
            return Err(ConfigError::ZeroChunk("outer_chunk"));
        }
        if self.inner_chunk == 0 {
            return Err(ConfigError::ZeroChunk("inner_chunk"));
        }
        Ok(())
    }

    pub fn schedule(&self) -> Schedule {
        Schedule {
            outer_chunk: self.outer_chunk,
            inner_chunk: self.inner_chunk,
        }
    }
}

fn default_runs() -> usize {
    DEFAULT_NUM_RUNS
}

fn default_outer_chunk() -> usize {
    OUTER_CHUNK
}

fn default_inner_chunk() -> usize {
    INNER_CHUNK
}
