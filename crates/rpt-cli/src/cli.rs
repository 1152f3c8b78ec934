//! CLI argument definitions for `rpt`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use rpt_cli::commands::{
    TranslateRule, parse_column_pair, parse_expansion, parse_mapping, parse_translate_rule,
};
use rpt_transform::{
    ColumnMapping, DEFAULT_MATCH_COLUMN, DEFAULT_REPLACEMENT_COLUMN, ExpansionPath,
};

#[derive(Parser)]
#[command(
    name = "rpt",
    version,
    about = "reportkit - reshape, translate and check tabular report data",
    long_about = "Reshape, translate and check tabular report data.\n\n\
                  Reads and writes CSV (.csv) and JSON lines (.jsonl, .ndjson);\n\
                  the format of every file is taken from its extension."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags and RUST_LOG).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Worker threads for row-parallel steps (default: one per CPU).
    #[arg(long = "threads", value_name = "N", global = true)]
    pub threads: Option<usize>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Rewrite a table in the format of the output file.
    Convert(ConvertArgs),

    /// Show column types, null counts and the first rows of a table.
    Preview(PreviewArgs),

    /// Explode nested list columns into one row per element.
    Expand(ExpandArgs),

    /// Replace values through lookup tables.
    Translate(TranslateArgs),

    /// Rename, reorder and drop columns.
    Map(MapArgs),

    /// Drop rows listed in an exclusion table.
    Exclude(ExcludeArgs),

    /// Run a cross-table check and report failing rows.
    #[command(subcommand)]
    Check(CheckCommand),
}

#[derive(Subcommand)]
pub enum CheckCommand {
    /// Report rows whose key values occur more than once.
    Unique(UniqueArgs),

    /// Report rows whose keys have no match in another table.
    Xref(XrefArgs),
}

#[derive(Args)]
pub struct ConvertArgs {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct PreviewArgs {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Rows to show.
    #[arg(long = "rows", short = 'n', value_name = "N", default_value_t = 10)]
    pub rows: usize,
}

#[derive(Args)]
pub struct ExpandArgs {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Output column and the path that feeds it, e.g. `ITEM=ITEMS.*.NAME`.
    /// Repeat for each output column.
    #[arg(long = "path", value_name = "TARGET=PATH", required = true, value_parser = parse_expansion)]
    pub paths: Vec<(String, ExpansionPath)>,

    /// Keep the nested source columns in the output.
    #[arg(long = "keep-source")]
    pub keep_source: bool,
}

#[derive(Args)]
pub struct TranslateArgs {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Columns to translate and their lookup CSV, e.g. `COUNTRY=countries.csv`.
    /// Rules run in the order given.
    #[arg(long = "rule", value_name = "COLS=FILE", required = true, value_parser = parse_translate_rule)]
    pub rules: Vec<TranslateRule>,

    /// Match columns inside the lookup files.
    #[arg(
        long = "match-column",
        value_name = "NAME",
        value_delimiter = ',',
        default_value = DEFAULT_MATCH_COLUMN
    )]
    pub match_columns: Vec<String>,

    /// Replacement column inside the lookup files.
    #[arg(
        long = "replacement-column",
        value_name = "NAME",
        default_value = DEFAULT_REPLACEMENT_COLUMN
    )]
    pub replacement_column: String,

    /// Fail on any value a lookup does not cover.
    #[arg(long = "strict")]
    pub strict: bool,
}

#[derive(Args)]
pub struct MapArgs {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Output position and column, e.g. `1:subject_id=SUBJECT`. Columns
    /// without a mapping are dropped.
    #[arg(long = "map", value_name = "N:SRC[=DEST]", required = true, value_parser = parse_mapping)]
    pub mappings: Vec<ColumnMapping>,
}

#[derive(Args)]
pub struct ExcludeArgs {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Table of rows to exclude.
    #[arg(long = "list", value_name = "FILE")]
    pub list: PathBuf,

    /// Input column and exclusion-list column to compare.
    #[arg(long = "on", value_name = "COL[=LIST_COL]", required = true, value_parser = parse_column_pair)]
    pub pairs: Vec<(String, String)>,
}

#[derive(Args)]
pub struct UniqueArgs {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Key columns; whole rows are compared when omitted.
    #[arg(long = "key", value_name = "COLUMN", value_delimiter = ',')]
    pub keys: Vec<String>,

    /// Write failing rows to this file.
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct XrefArgs {
    #[arg(value_name = "LEFT")]
    pub left: PathBuf,

    #[arg(value_name = "RIGHT")]
    pub right: PathBuf,

    /// Key columns in the left table.
    #[arg(long = "left-key", value_name = "COLUMN", value_delimiter = ',', required = true)]
    pub left_keys: Vec<String>,

    /// Key columns in the right table, paired with `--left-key` by position.
    #[arg(long = "right-key", value_name = "COLUMN", value_delimiter = ',', required = true)]
    pub right_keys: Vec<String>,

    /// Let rows whose left keys are all empty pass.
    #[arg(long = "ignore-blanks")]
    pub ignore_blanks: bool,

    /// Write failing rows to this file.
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
