//! Lookup-table driven value substitution.
//!
//! A rule pairs an ordered list of match columns with a [`TranslationTable`]
//! keyed by tuples of those columns' values. On a hit, the last match column
//! is overwritten with the table's replacement. Rules run in registration
//! order, so a later rule sees values rewritten by an earlier one.

use std::collections::HashMap;

use tracing::{debug, info};

use rpt_ingest::{Source, load_csv};
use rpt_model::{RowAccess, Table, Value, describe_key};
use rpt_parallel::apply_rows;

use crate::error::TranslateError;

/// Default match column when loading a translation table.
pub const DEFAULT_MATCH_COLUMN: &str = "old-val";
/// Default replacement column when loading a translation table.
pub const DEFAULT_REPLACEMENT_COLUMN: &str = "new-val";

/// Match tuple to replacement value.
///
/// `strict` tables make the row-wise path fail on a lookup miss.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationTable {
    entries: HashMap<Vec<Value>, Value>,
    strict: bool,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(match tuple, replacement)` pairs. Later
    /// duplicates replace earlier ones.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Vec<Value>, Value)>,
    {
        Self {
            entries: entries.into_iter().collect(),
            strict: false,
        }
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn insert(&mut self, key: Vec<Value>, replacement: Value) -> Option<Value> {
        self.entries.insert(key, replacement)
    }

    pub fn get(&self, key: &[Value]) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reads entries from the rows of `table`: the match tuple from
    /// `match_columns`, the replacement from `replacement_column`.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::NoMatchColumns`] for an empty column list and
    /// [`TranslateError::Model`] when a named column is missing.
    pub fn from_table<S: AsRef<str>>(
        table: &Table,
        match_columns: &[S],
        replacement_column: &str,
    ) -> Result<Self, TranslateError> {
        if match_columns.is_empty() {
            return Err(TranslateError::NoMatchColumns);
        }
        let positions = table.schema().require_all(match_columns)?;
        let replacement = table.schema().require(replacement_column)?;

        let entries = (0..table.height()).map(|row| {
            let value = table.value_at(row, replacement).cloned().unwrap_or_default();
            (table.key_tuple(row, &positions), value)
        });
        let loaded = Self::from_entries(entries);
        debug!(rows = table.height(), entries = loaded.len(), "loaded translation table");
        Ok(loaded)
    }

    /// Loads a CSV translation table with every column read as text.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::Ingest`] when the CSV cannot be read, plus
    /// the errors of [`Self::from_table`].
    pub fn from_csv<S: AsRef<str>>(
        source: &Source,
        match_columns: &[S],
        replacement_column: &str,
    ) -> Result<Self, TranslateError> {
        let table = load_csv(source, None, None)?;
        Self::from_table(&table, match_columns, replacement_column)
    }

    /// [`Self::from_csv`] with the `old-val` / `new-val` column names.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_csv`].
    pub fn from_csv_default(source: &Source) -> Result<Self, TranslateError> {
        Self::from_csv(source, &[DEFAULT_MATCH_COLUMN], DEFAULT_REPLACEMENT_COLUMN)
    }
}

/// A registered rule: match columns plus their lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRule {
    columns: Vec<String>,
    table: TranslationTable,
}

impl TranslationRule {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn table(&self) -> &TranslationTable {
        &self.table
    }

    fn target(&self) -> &str {
        self.columns.last().map_or("", String::as_str)
    }
}

/// Ordered set of translation rules.
#[derive(Debug, Clone, Default)]
pub struct ValueTranslator {
    rules: Vec<TranslationRule>,
}

impl ValueTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `table` for `match_columns`. Registering the same column
    /// tuple again replaces the earlier table but keeps its position.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::NoMatchColumns`] for an empty column list and
    /// [`TranslateError::KeyWidth`] if a key's width differs from the column count.
    pub fn add_rule<S: AsRef<str>>(
        &mut self,
        match_columns: &[S],
        table: TranslationTable,
    ) -> Result<(), TranslateError> {
        if match_columns.is_empty() {
            return Err(TranslateError::NoMatchColumns);
        }
        let columns: Vec<String> = match_columns.iter().map(|c| c.as_ref().to_string()).collect();
        if let Some(key) = table.entries.keys().find(|key| key.len() != columns.len()) {
            return Err(TranslateError::KeyWidth {
                expected: columns.len(),
                actual: key.len(),
                columns,
            });
        }

        match self.rules.iter_mut().find(|rule| rule.columns == columns) {
            Some(rule) => rule.table = table,
            None => self.rules.push(TranslationRule { columns, table }),
        }
        Ok(())
    }

    pub fn rules(&self) -> &[TranslationRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Applies every rule to one row, in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::LookupMiss`] when a strict table has no entry
    /// for the row, and [`TranslateError::Model`] for an unknown match column.
    pub fn translate_row<R: RowAccess + ?Sized>(&self, row: &mut R) -> Result<(), TranslateError> {
        for rule in &self.rules {
            let key = rule
                .columns
                .iter()
                .map(|column| row.get(column).cloned())
                .collect::<rpt_model::Result<Vec<_>>>()?;
            match rule.table.get(&key) {
                Some(replacement) => row.set(rule.target(), replacement.clone())?,
                None if rule.table.strict => {
                    return Err(TranslateError::LookupMiss {
                        key: describe_key(&rule.columns, &key),
                    });
                }
                None => {}
            }
        }
        Ok(())
    }

    /// Row-wise translation of a whole table on the row mapper.
    ///
    /// Honors `strict`, unlike [`Self::translate`].
    ///
    /// # Errors
    ///
    /// Returns the first row error from [`Self::translate_row`].
    pub fn translate_rows(&self, table: Table) -> Result<Table, TranslateError> {
        info!(rows = table.height(), rules = self.len(), "translating rows");
        apply_rows(table, |row| self.translate_row(row))
    }

    /// Whole-table translation.
    ///
    /// For each rule, every matching row is found before any cell is written,
    /// so a replacement never feeds another entry of the same rule. Strict
    /// tables are not enforced here; a miss leaves the value unchanged.
    /// Returns the number of cells rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::Model`] when a match column is missing or a
    /// replacement cannot be cast to the column type.
    pub fn translate(&self, table: &mut Table) -> Result<usize, TranslateError> {
        let mut rewritten = 0;
        for rule in &self.rules {
            let positions = table.schema().require_all(&rule.columns)?;
            let Some(&target) = positions.last() else {
                continue;
            };

            let hits: Vec<(usize, Value)> = (0..table.height())
                .filter_map(|row| {
                    rule.table
                        .get(&table.key_tuple(row, &positions))
                        .map(|replacement| (row, replacement.clone()))
                })
                .collect();

            debug!(columns = ?rule.columns, hits = hits.len(), "applying translation rule");
            rewritten += hits.len();
            for (row, replacement) in hits {
                table.set_cell_at(row, target, replacement)?;
            }
        }
        info!(rows = table.height(), cells = rewritten, "translated table");
        Ok(rewritten)
    }
}
