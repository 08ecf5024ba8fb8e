use anyhow::{Context, Result};
use clap::error::ErrorKind;

use totient_bench::Executor;
use totient_bench::bench::Runner;
use totient_bench::config::{BenchConfig, NUM_RUNS_ENV};
use totient_bench::executor::Backend;
use totient_bench::options::{Options, OptionsError};
use totient_bench::report;
use totient_bench::totient::TotientRange;

fn main() {
    if std::env::var("TOTIENT_LOG").is_ok() {
        let e = env_logger::Env::new()
            .filter("TOTIENT_LOG")
            .write_style("TOTIENT_LOG_STYLE");
        env_logger::init_from_env(e);
    }

    let options = match Options::parse_from_args(std::env::args_os().skip(1)) {
        Ok(options) => options,
        Err(OptionsError::Clap(err))
            if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) =>
        {
            err.exit()
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    log::debug!("options: {:?}", options);

    let exit_code = match run(&options) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(options: &Options) -> Result<()> {
    let config = BenchConfig::resolve(
        options.config.as_deref(),
        std::env::var(NUM_RUNS_ENV).ok().as_deref(),
        options,
    )?;

    let backend =
        Backend::from_mode(config.mode, config.threads).context("Failed to start worker pool")?;
    log::info!(
        "summing totients over [{}..{}]: {:?} mode, {} workers, {:?} nesting, {} runs",
        options.lower,
        options.upper,
        config.mode,
        backend.workers(),
        config.nesting,
        config.runs
    );

    let runner = Runner::new(TotientRange::new(
        backend,
        config.schedule(),
        config.nesting,
    ));
    let report = runner.run_n(options.lower, options.upper, config.runs)?;
    log::info!(
        "median {:.6} s over {} runs (fastest {:.6} s, slowest {:.6} s)",
        report.median_secs,
        report.runs.len(),
        report.runs.fastest().unwrap_or(report.median_secs),
        report.runs.slowest().unwrap_or(report.median_secs)
    );
    print!("{report}");

    if let Some(path) = &options.output {
        report::write_json(path, &report)
            .with_context(|| format!("Failed to write report to {:?}", path))?;
    }
    Ok(())
}
