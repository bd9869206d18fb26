//! `etl` command-line runner.

use clap::{ColorChoice, Parser};
use etl_cli::logging::{LogConfig, init_logging};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;
mod types;

use crate::cli::{Cli, Command};
use crate::commands::{run_job, run_pipeline, run_summary};
use crate::summary::{print_run_summary, print_source_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Run(args) => finish(run_pipeline(&args), print_run_summary),
        Command::Job(args) => finish(run_job(&args), print_run_summary),
        Command::Summary(args) => finish(run_summary(&args), print_source_summary),
    };
    std::process::exit(exit_code);
}

fn finish<T>(result: anyhow::Result<T>, print: fn(&T)) -> i32 {
    match result {
        Ok(outcome) => {
            print(&outcome);
            0
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    }
}

/// Logging settings from the global flags. An explicit `--log-level` beats
/// -v/-q, and either one turns off `RUST_LOG`.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level_filter = cli
        .log_level
        .map_or_else(|| cli.verbosity.tracing_level_filter(), LevelFilter::from);
    let with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    LogConfig {
        level_filter,
        use_env_filter: !cli.verbosity.is_present() && cli.log_level.is_none(),
        with_ansi,
        format: cli.log_format.into(),
        log_file: cli.log_file.clone(),
        ..LogConfig::default()
    }
}
