//! reportkit command-line interface.

use clap::{ColorChoice, Parser};
use rpt_cli::logging::{LogConfig, LogFormat, init_logging};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use rpt_cli::commands::{
    CheckReport, ExcludeOptions, ExpandOptions, StepReport, TranslateOptions, XrefOptions,
    run_convert, run_exclude, run_expand, run_map, run_preview, run_translate, run_unique,
    run_xref,
};
use rpt_parallel::{MapOptions, init_global_pool};

use crate::cli::{CheckCommand, Cli, Command, LogFormatArg, LogLevelArg};
use crate::summary::{print_check, print_preview, print_step};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    if let Some(threads) = cli.threads
        && let Err(error) = init_global_pool(MapOptions {
            threads: Some(threads),
        })
    {
        eprintln!("error: {error}");
        std::process::exit(1);
    }

    let exit_code = match cli.command {
        Command::Convert(args) => finish_step(run_convert(&args.input, &args.output)),
        Command::Preview(args) => match run_preview(&args.input, args.rows) {
            Ok(report) => {
                print_preview(&report);
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Expand(args) => finish_step(run_expand(&ExpandOptions {
            input: args.input,
            output: args.output,
            paths: args.paths,
            keep_source: args.keep_source,
        })),
        Command::Translate(args) => finish_step(run_translate(&TranslateOptions {
            input: args.input,
            output: args.output,
            rules: args.rules,
            match_columns: args.match_columns,
            replacement_column: args.replacement_column,
            strict: args.strict,
        })),
        Command::Map(args) => finish_step(run_map(&args.input, &args.output, &args.mappings)),
        Command::Exclude(args) => finish_step(run_exclude(&ExcludeOptions {
            input: args.input,
            output: args.output,
            list: args.list,
            pairs: args.pairs,
        })),
        Command::Check(CheckCommand::Unique(args)) => finish_check(run_unique(
            &args.input,
            &args.keys,
            args.output.as_deref(),
        )),
        Command::Check(CheckCommand::Xref(args)) => finish_check(run_xref(&XrefOptions {
            left: args.left,
            left_keys: args.left_keys,
            right: args.right,
            right_keys: args.right_keys,
            ignore_blanks: args.ignore_blanks,
            output: args.output,
        })),
    };
    std::process::exit(exit_code);
}

fn finish_step(result: anyhow::Result<StepReport>) -> i32 {
    match result {
        Ok(report) => {
            print_step(&report);
            0
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    }
}

/// Failing checks exit with 1, like errors.
fn finish_check(result: anyhow::Result<CheckReport>) -> i32 {
    match result {
        Ok(report) => {
            print_check(&report);
            if report.passed() { 0 } else { 1 }
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level_filter = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    LogConfig::default()
        .with_level(level_filter)
        .with_env_filter(!(cli.verbosity.is_present() || cli.log_level.is_some()))
        .with_format(format)
        .with_ansi(with_ansi)
        .with_timestamps(cli.log_file.is_some())
        .with_log_file(cli.log_file.clone())
}
