//! The work behind each `rpt` subcommand.
//!
//! Every command reads its inputs in the format their extension names, runs
//! one library operation and writes the result, returning a report for the
//! summary table. Argument parsers for the compound `--path`, `--rule`,
//! `--map` and `--on` values live here too so they can be tested directly.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::info;

use rpt_ingest::{Source, read_table, table_to_frame, write_table};
use rpt_model::Table;
use rpt_transform::{
    ColumnMapping, ExpansionPath, ExpansionPlan, TranslationTable, ValueTranslator,
    apply_exclusion_list, apply_mappings, expand_multivalued,
};
use rpt_validate::{FailureRecord, failures_to_table, unique_keys, xref_integrity};

/// Outcome of a table-to-table command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: &'static str,
    pub input: PathBuf,
    pub output: PathBuf,
    pub rows_in: usize,
    pub rows_out: usize,
    pub columns: usize,
    /// Values replaced or rows removed, for steps that count them.
    pub changed: Option<usize>,
}

impl StepReport {
    fn new(step: &'static str, input: &Path, output: &Path, rows_in: usize, result: &Table) -> Self {
        Self {
            step,
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            rows_in,
            rows_out: result.height(),
            columns: result.width(),
            changed: None,
        }
    }

    fn with_changed(mut self, changed: usize) -> Self {
        self.changed = Some(changed);
        self
    }
}

/// Outcome of a check command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub check: &'static str,
    pub rows: usize,
    pub failures: Vec<FailureRecord>,
    pub output: Option<PathBuf>,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Column profile and leading rows of a table, computed through polars.
#[derive(Debug, Clone)]
pub struct PreviewReport {
    pub input: PathBuf,
    pub rows: usize,
    pub columns: Vec<ColumnProfile>,
    pub head: DataFrame,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnProfile {
    pub name: String,
    /// polars dtype the column was handed over as.
    pub dtype: String,
    pub nulls: usize,
}

#[derive(Debug, Clone)]
pub struct ExpandOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    /// `(target column, path)` in output column order.
    pub paths: Vec<(String, ExpansionPath)>,
    pub keep_source: bool,
}

/// One `--rule`: the columns to match and the lookup file for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateRule {
    pub columns: Vec<String>,
    pub table: PathBuf,
}

#[derive(Debug, Clone)]
pub struct TranslateOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub rules: Vec<TranslateRule>,
    /// Match columns inside each lookup file.
    pub match_columns: Vec<String>,
    pub replacement_column: String,
    /// Fail on values missing from a lookup. Runs row by row.
    pub strict: bool,
}

#[derive(Debug, Clone)]
pub struct ExcludeOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub list: PathBuf,
    /// `(table column, list column)` pairs.
    pub pairs: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct XrefOptions {
    pub left: PathBuf,
    pub left_keys: Vec<String>,
    pub right: PathBuf,
    pub right_keys: Vec<String>,
    pub ignore_blanks: bool,
    pub output: Option<PathBuf>,
}

fn load(path: &Path) -> Result<Table> {
    read_table(path, None).with_context(|| format!("failed to read {}", path.display()))
}

fn save(table: &Table, path: &Path) -> Result<()> {
    write_table(table, path).with_context(|| format!("failed to write {}", path.display()))
}

/// Rewrites `input` in the format of `output`.
pub fn run_convert(input: &Path, output: &Path) -> Result<StepReport> {
    let table = load(input)?;
    save(&table, output)?;
    info!(rows = table.height(), columns = table.width(), "converted table");
    Ok(StepReport::new("convert", input, output, table.height(), &table))
}

/// Hands `input` to polars for a column profile and its first `rows` rows.
pub fn run_preview(input: &Path, rows: usize) -> Result<PreviewReport> {
    let table = load(input)?;
    let frame = table_to_frame(&table)
        .with_context(|| format!("failed to build a DataFrame from {}", input.display()))?;
    let columns = frame
        .get_columns()
        .iter()
        .map(|column| ColumnProfile {
            name: column.name().to_string(),
            dtype: column.dtype().to_string(),
            nulls: column.null_count(),
        })
        .collect();
    info!(rows = frame.height(), columns = frame.width(), "built preview frame");
    Ok(PreviewReport {
        input: input.to_path_buf(),
        rows: frame.height(),
        columns,
        head: frame.head(Some(rows)),
    })
}

pub fn run_expand(options: &ExpandOptions) -> Result<StepReport> {
    let table = load(&options.input)?;
    let plan = options
        .paths
        .iter()
        .cloned()
        .fold(ExpansionPlan::new(), |plan, (target, path)| plan.with_path(target, path))
        .drop_source_columns(!options.keep_source);

    let expanded = expand_multivalued(&table, &plan)
        .with_context(|| format!("failed to expand {}", options.input.display()))?;
    save(&expanded, &options.output)?;
    Ok(StepReport::new(
        "expand",
        &options.input,
        &options.output,
        table.height(),
        &expanded,
    ))
}

/// Applies every rule in order. Strict runs go row by row and stop at the
/// first value a lookup does not cover; otherwise unmatched values are kept.
pub fn run_translate(options: &TranslateOptions) -> Result<StepReport> {
    let mut table = load(&options.input)?;
    let mut translator = ValueTranslator::new();
    for rule in &options.rules {
        let lookup = TranslationTable::from_csv(
            &Source::from_path(&rule.table),
            &options.match_columns,
            &options.replacement_column,
        )
        .with_context(|| format!("failed to load translation table {}", rule.table.display()))?
        .with_strict(options.strict);
        translator
            .add_rule(&rule.columns, lookup)
            .with_context(|| format!("invalid rule for columns {}", rule.columns.join(",")))?;
    }

    let rows_in = table.height();
    let report = if options.strict {
        let translated = translator
            .translate_rows(table)
            .context("strict translation failed")?;
        save(&translated, &options.output)?;
        StepReport::new("translate", &options.input, &options.output, rows_in, &translated)
    } else {
        let replaced = translator.translate(&mut table).context("translation failed")?;
        save(&table, &options.output)?;
        StepReport::new("translate", &options.input, &options.output, rows_in, &table)
            .with_changed(replaced)
    };
    Ok(report)
}

pub fn run_map(input: &Path, output: &Path, mappings: &[ColumnMapping]) -> Result<StepReport> {
    let mut table = load(input)?;
    apply_mappings(&mut table, mappings).context("failed to apply column mappings")?;
    save(&table, output)?;
    Ok(StepReport::new("map", input, output, table.height(), &table))
}

pub fn run_exclude(options: &ExcludeOptions) -> Result<StepReport> {
    let mut table = load(&options.input)?;
    let listed = load(&options.list)?;
    let rows_in = table.height();
    let removed = apply_exclusion_list(&mut table, &listed, &options.pairs)
        .with_context(|| format!("failed to apply exclusion list {}", options.list.display()))?;
    save(&table, &options.output)?;
    Ok(StepReport::new("exclude", &options.input, &options.output, rows_in, &table)
        .with_changed(removed))
}

/// Duplicate detection on `keys`, or on whole rows when `keys` is empty.
pub fn run_unique(input: &Path, keys: &[String], output: Option<&Path>) -> Result<CheckReport> {
    let table = load(input)?;
    let keys = (!keys.is_empty()).then_some(keys);
    let failures = unique_keys(&table, keys).context("uniqueness check could not run")?;
    write_failures(&failures, output)?;
    Ok(CheckReport {
        check: "unique",
        rows: table.height(),
        failures,
        output: output.map(Path::to_path_buf),
    })
}

pub fn run_xref(options: &XrefOptions) -> Result<CheckReport> {
    let left = load(&options.left)?;
    let right = load(&options.right)?;
    let failures = xref_integrity(
        &left,
        &options.left_keys,
        &right,
        &options.right_keys,
        options.ignore_blanks,
    )
    .context("xref check could not run")?;
    write_failures(&failures, options.output.as_deref())?;
    Ok(CheckReport {
        check: "xref",
        rows: left.height(),
        failures,
        output: options.output.clone(),
    })
}

fn write_failures(failures: &[FailureRecord], output: Option<&Path>) -> Result<()> {
    let Some(path) = output else {
        return Ok(());
    };
    let table = failures_to_table(failures).context("failed to tabulate check failures")?;
    save(&table, path)
}

// === Argument parsers ===

/// `TARGET=SOURCE.key.*.key`
pub fn parse_expansion(text: &str) -> Result<(String, ExpansionPath), String> {
    let (target, path) = text
        .split_once('=')
        .ok_or_else(|| format!("expected TARGET=PATH, got '{text}'"))?;
    let target = target.trim();
    if target.is_empty() {
        return Err(format!("missing target column in '{text}'"));
    }
    let path = ExpansionPath::parse(path.trim()).map_err(|error| error.to_string())?;
    Ok((target.to_string(), path))
}

/// `COL[,COL...]=LOOKUP.csv`
pub fn parse_translate_rule(text: &str) -> Result<TranslateRule, String> {
    let (columns, table) = text
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMNS=FILE, got '{text}'"))?;
    let columns: Vec<String> = columns
        .split(',')
        .map(str::trim)
        .filter(|column| !column.is_empty())
        .map(str::to_string)
        .collect();
    if columns.is_empty() || table.trim().is_empty() {
        return Err(format!("expected COLUMNS=FILE, got '{text}'"));
    }
    Ok(TranslateRule {
        columns,
        table: PathBuf::from(table.trim()),
    })
}

/// `ORDINAL:SOURCE[=DESTINATION]`; without a destination the name is kept.
pub fn parse_mapping(text: &str) -> Result<ColumnMapping, String> {
    let (ordinal, columns) = text
        .split_once(':')
        .ok_or_else(|| format!("expected ORDINAL:SOURCE[=DEST], got '{text}'"))?;
    let ordinal: u32 = ordinal
        .trim()
        .parse()
        .map_err(|_| format!("invalid ordinal '{ordinal}'"))?;
    let (source, destination) = parse_column_pair(columns)?;
    Ok(ColumnMapping::new(ordinal, source, destination))
}

/// `LEFT[=RIGHT]`; a single name matches the same column on both sides.
pub fn parse_column_pair(text: &str) -> Result<(String, String), String> {
    let (left, right) = text.split_once('=').unwrap_or((text, text));
    let (left, right) = (left.trim(), right.trim());
    if left.is_empty() || right.is_empty() {
        return Err(format!("expected COLUMN[=COLUMN], got '{text}'"));
    }
    Ok((left.to_string(), right.to_string()))
}
