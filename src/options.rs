//! Command-line options.
//! `totient [OPTIONS] <lower> <upper>`; flags override the config file and `NUM_RUNS`.

use clap::{Arg, ArgAction, Command, value_parser};
use std::path::PathBuf;
use thiserror::Error;

use crate::config::BenchConfig;
use crate::executor::Mode;
use crate::totient::Nesting;

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("not 2 arguments (got {0})")]
    Usage(usize),
    #[error("invalid {name} bound {value:?}: expected a signed 64-bit integer")]
    InvalidBound { name: &'static str, value: String },
    #[error(transparent)]
    Clap(#[from] clap::Error),
}

fn make_options_parser() -> clap::Command {
    let parser = Command::new("totient")
        .no_binary_name(true)
        .about("Sum of Euler's totient over [lower..upper], timed as the median of repeated runs")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("bounds")
                .value_name("BOUND")
                .help("Inclusive lower and upper bounds")
                .action(ArgAction::Append)
                .num_args(0..)
                .allow_negative_numbers(true),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .help("Execution mode")
                .value_parser(["sequential", "seq", "parallel", "par"]),
        )
        .arg(
            Arg::new("threads")
                .short('j')
                .long("threads")
                .value_name("N")
                .help("Worker pool size [default: available parallelism]")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("runs")
                .short('r')
                .long("runs")
                .value_name("N")
                .help("Number of timed runs; overrides NUM_RUNS")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("nesting")
                .long("nesting")
                .help("Where each totient's inner reduction runs")
                .value_parser(["shared", "flattened"]),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML configuration file")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Also write the report as JSON to this file")
                .value_parser(value_parser!(PathBuf)),
        );
    parser
}

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub lower: i64,
    pub upper: i64,
    pub mode: Option<Mode>,
    pub threads: Option<usize>,
    pub runs: Option<usize>,
    pub nesting: Option<Nesting>,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl Options {
    /// Parses arguments without the binary name.
    pub fn parse_from_args<I, T>(args: I) -> Result<Self, OptionsError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = make_options_parser().try_get_matches_from(args)?;

        let bounds: Vec<&String> = matches
            .get_many::<String>("bounds")
            .map(|values| values.collect())
            .unwrap_or_default();
        let &[lower, upper] = bounds.as_slice() else {
            return Err(OptionsError::Usage(bounds.len()));
        };
        let lower = parse_bound("lower", lower)?;
        let upper = parse_bound("upper", upper)?;

        let mode = match matches.get_one::<String>("mode").map(String::as_str) {
            Some("sequential" | "seq") => Some(Mode::Sequential),
            Some("parallel" | "par") => Some(Mode::Parallel),
            _ => None,
        };
        let nesting = match matches.get_one::<String>("nesting").map(String::as_str) {
            Some("shared") => Some(Nesting::Shared),
            Some("flattened") => Some(Nesting::Flattened),
            _ => None,
        };

        Ok(Options {
            lower,
            upper,
            mode,
            threads: matches.get_one::<usize>("threads").copied(),
            runs: matches.get_one::<usize>("runs").copied(),
            nesting,
            config: matches.get_one::<PathBuf>("config").cloned(),
            output: matches.get_one::<PathBuf>("output").cloned(),
        })
    }

    /// Layers the flags that were given on top of `config`.
    pub fn apply_to(&self, config: &mut BenchConfig) {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(threads) = self.threads {
            config.threads = Some(threads);
        }
        if let Some(runs) = self.runs {
            config.runs = runs;
        }
        if let Some(nesting) = self.nesting {
            config.nesting = nesting;
        }
    }
}

fn parse_bound(name: &'static str, value: &str) -> Result<i64, OptionsError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| OptionsError::InvalidBound {
            name,
            value: value.to_string(),
        })
}
