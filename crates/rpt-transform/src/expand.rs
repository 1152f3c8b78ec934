//! Multi-valued expansion: one output row per element of a nested list.
//!
//! An [`ExpansionPath`] names a source column and a key path with exactly one
//! wildcard. Keys before the wildcard walk nested maps down to a list; keys
//! after it walk each list element down to the leaf that fills the target
//! column. A source row expands into as many rows as its longest list. Paths
//! with shorter lists contribute null past their own end.

use std::fmt;

use tracing::{debug, info};

use rpt_ingest::load_records;
use rpt_model::{Record, Row, Table, Value, plain_fields};
use rpt_parallel::map_rows;

use crate::error::ExpandError;

const WILDCARD: &str = "*";

/// One element of a key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathKey {
    Key(String),
    Wildcard,
}

impl PathKey {
    pub fn key(name: impl Into<String>) -> Self {
        Self::Key(name.into())
    }
}

/// A source column plus a key path containing exactly one wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionPath {
    source: String,
    prefix: Vec<String>,
    suffix: Vec<String>,
}

impl ExpansionPath {
    /// # Errors
    ///
    /// Returns [`ExpandError::MissingWildcard`] or
    /// [`ExpandError::ExtraWildcards`] unless `keys` holds exactly one wildcard.
    pub fn new(source: impl Into<String>, keys: Vec<PathKey>) -> Result<Self, ExpandError> {
        let source = source.into();
        let wildcards = keys.iter().filter(|key| **key == PathKey::Wildcard).count();
        if wildcards != 1 {
            let path = render(&source, &keys);
            return Err(if wildcards == 0 {
                ExpandError::MissingWildcard { path }
            } else {
                ExpandError::ExtraWildcards {
                    path,
                    count: wildcards,
                }
            });
        }

        let mut prefix = Vec::new();
        let mut suffix = Vec::new();
        let mut seen_wildcard = false;
        for key in keys {
            match key {
                PathKey::Wildcard => seen_wildcard = true,
                PathKey::Key(name) if seen_wildcard => suffix.push(name),
                PathKey::Key(name) => prefix.push(name),
            }
        }
        Ok(Self {
            source,
            prefix,
            suffix,
        })
    }

    /// Parses the dotted form `SOURCE.key.*.key`, where `*` is the wildcard.
    ///
    /// # Errors
    ///
    /// Returns [`ExpandError::InvalidPath`] for an empty segment or a wildcard
    /// in the source position, plus the wildcard errors of [`Self::new`].
    pub fn parse(text: &str) -> Result<Self, ExpandError> {
        let mut segments = text.split('.');
        let source = match segments.next() {
            Some(source) if !source.is_empty() && source != WILDCARD => source,
            _ => {
                return Err(ExpandError::InvalidPath {
                    text: text.to_string(),
                    reason: "path must start with a source column",
                });
            }
        };
        let keys = segments
            .map(|segment| match segment {
                "" => Err(ExpandError::InvalidPath {
                    text: text.to_string(),
                    reason: "empty key segment",
                }),
                WILDCARD => Ok(PathKey::Wildcard),
                name => Ok(PathKey::key(name)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(source, keys)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// The key path with the wildcard restored in place.
    pub fn keys(&self) -> Vec<PathKey> {
        self.prefix
            .iter()
            .cloned()
            .map(PathKey::Key)
            .chain(std::iter::once(PathKey::Wildcard))
            .chain(self.suffix.iter().cloned().map(PathKey::Key))
            .collect()
    }

    /// Length of the list at the wildcard; null anywhere before it counts as empty.
    fn sub_length(&self, root: &Value) -> Result<usize, Misshapen> {
        match walk(root, &self.prefix)? {
            None => Ok(0),
            Some(Value::List(items)) => Ok(items.len()),
            Some(other) => Err(Misshapen {
                step: WILDCARD.to_string(),
                expected: "list",
                found: other.kind(),
            }),
        }
    }

    /// The leaf for list element `index`, or null when the list is shorter.
    fn resolve(&self, root: &Value, index: usize) -> Result<Value, Misshapen> {
        let Some(Value::List(items)) = walk(root, &self.prefix)? else {
            return Ok(Value::Null);
        };
        match items.get(index) {
            Some(item) => Ok(walk(item, &self.suffix)?.cloned().unwrap_or_default()),
            None => Ok(Value::Null),
        }
    }
}

impl fmt::Display for ExpansionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&self.source, &self.keys()))
    }
}

fn render(source: &str, keys: &[PathKey]) -> String {
    let mut text = source.to_string();
    for key in keys {
        text.push('.');
        match key {
            PathKey::Key(name) => text.push_str(name),
            PathKey::Wildcard => text.push_str(WILDCARD),
        }
    }
    text
}

struct Misshapen {
    step: String,
    expected: &'static str,
    found: &'static str,
}

/// Follows map keys from `value`. Null or a missing key ends the walk with `None`.
fn walk<'v>(mut value: &'v Value, keys: &[String]) -> Result<Option<&'v Value>, Misshapen> {
    for key in keys {
        match value {
            Value::Null => return Ok(None),
            Value::Map(map) => match map.get(key) {
                Some(next) => value = next,
                None => return Ok(None),
            },
            other => {
                return Err(Misshapen {
                    step: key.clone(),
                    expected: "map",
                    found: other.kind(),
                });
            }
        }
    }
    Ok((!value.is_null()).then_some(value))
}

/// Target columns and their paths, in insertion order.
#[derive(Debug, Clone)]
pub struct ExpansionPlan {
    paths: Vec<(String, ExpansionPath)>,
    drop_source_columns: bool,
}

impl Default for ExpansionPlan {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            drop_source_columns: true,
        }
    }
}

impl ExpansionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a path; a repeated target replaces the earlier path.
    #[must_use]
    pub fn with_path(mut self, target: impl Into<String>, path: ExpansionPath) -> Self {
        self.insert(target, path);
        self
    }

    pub fn insert(&mut self, target: impl Into<String>, path: ExpansionPath) {
        let target = target.into();
        match self.paths.iter_mut().find(|(name, _)| *name == target) {
            Some(entry) => entry.1 = path,
            None => self.paths.push((target, path)),
        }
    }

    /// Whether source columns are removed from the output. Defaults to true.
    #[must_use]
    pub fn drop_source_columns(mut self, drop: bool) -> Self {
        self.drop_source_columns = drop;
        self
    }

    pub fn paths(&self) -> &[(String, ExpansionPath)] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Output column order: the input columns, then new targets, minus the
    /// source columns when they are dropped.
    fn output_columns(&self, table: &Table) -> Vec<String> {
        let mut columns: Vec<String> = table.column_names().to_vec();
        for (target, _) in &self.paths {
            if !columns.contains(target) {
                columns.push(target.clone());
            }
        }
        if self.drop_source_columns {
            columns.retain(|name| !self.paths.iter().any(|(_, path)| path.source == *name));
        }
        columns
    }

    fn expand_row(&self, row: Row<'_>, columns: &[String]) -> Result<Option<Vec<Record>>, ExpandError> {
        let mut roots = Vec::with_capacity(self.paths.len());
        let mut row_count = 0;
        for (target, path) in &self.paths {
            let root = row.get(&path.source)?;
            let length = path
                .sub_length(root)
                .map_err(|err| shape_error(row, target, err))?;
            row_count = row_count.max(length);
            roots.push(root);
        }
        if row_count == 0 {
            return Ok(None);
        }

        let skeleton: Record = columns
            .iter()
            .filter(|name| !self.paths.iter().any(|(target, _)| target == *name))
            .filter_map(|name| row.get(name).ok().map(|value| (name.clone(), value.clone())))
            .collect();

        let mut records = Vec::with_capacity(row_count);
        for index in 0..row_count {
            let mut record = skeleton.clone();
            for ((target, path), root) in self.paths.iter().zip(&roots) {
                let leaf = path
                    .resolve(root, index)
                    .map_err(|err| shape_error(row, target, err))?;
                record.insert(target.clone(), leaf);
            }
            records.push(record);
        }
        Ok(Some(records))
    }
}

fn shape_error(row: Row<'_>, target: &str, err: Misshapen) -> ExpandError {
    ExpandError::Shape {
        row: row.label().to_string(),
        target: target.to_string(),
        step: err.step,
        expected: err.expected,
        found: err.found,
    }
}

/// Explodes every row of `table` along the plan's paths.
///
/// Rows whose lists are all empty (or null) produce no output. The exploded
/// rows are re-loaded with an untyped schema over the output columns, so nulls
/// from shorter paths come back as empty strings and the index is positional.
///
/// # Errors
///
/// Configuration errors ([`ExpandError::EmptyPlan`],
/// [`ExpandError::UnknownColumn`]) are raised before any row is read. A value
/// of the wrong shape along a key path is an [`ExpandError::Shape`].
pub fn expand_multivalued(table: &Table, plan: &ExpansionPlan) -> Result<Table, ExpandError> {
    if plan.is_empty() {
        return Err(ExpandError::EmptyPlan);
    }
    for (target, path) in &plan.paths {
        if !table.schema().contains(&path.source) {
            return Err(ExpandError::UnknownColumn {
                target: target.clone(),
                column: path.source.clone(),
            });
        }
    }

    let columns = plan.output_columns(table);
    info!(rows = table.height(), paths = plan.len(), "expanding multi-valued columns");

    let expanded = map_rows(table, |row| plan.expand_row(row, &columns))?;
    let empty = expanded.iter().filter(|rows| rows.is_none()).count();
    debug!(rows_without_values = empty, "expanded rows");

    let records = expanded.into_iter().flatten().flatten();
    let result = load_records(records, &plain_fields(&columns), None)?;
    info!(rows = result.height(), "expansion complete");
    Ok(result)
}
