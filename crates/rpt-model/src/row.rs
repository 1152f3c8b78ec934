//! Transient dict-style views over one table row.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ModelError, Result};
use crate::table::{RowLabel, Table};
use crate::value::Value;

/// Owned name to value mapping: the input unit of the record loader.
pub type Record = BTreeMap<String, Value>;

/// Named-field get/set access shared by row views and owned records.
pub trait RowAccess {
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownColumn`] when the field does not exist.
    fn get(&self, name: &str) -> Result<&Value>;

    /// # Errors
    ///
    /// Fails when the field does not exist or the value cannot be stored.
    fn set(&mut self, name: &str, value: Value) -> Result<()>;
}

/// Read-only view of one row, borrowed from its table.
#[derive(Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    position: usize,
}

impl<'a> Row<'a> {
    pub(crate) fn new(table: &'a Table, position: usize) -> Self {
        Self { table, position }
    }

    /// Position of the row in the table (not its label).
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn label(&self) -> &'a RowLabel {
        &self.table.index()[self.position]
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    /// # Errors
    ///
    /// Returns [`ModelError::UnknownColumn`] when the column does not exist.
    pub fn get(&self, name: &str) -> Result<&'a Value> {
        self.table.cell(self.position, name)
    }

    /// Returns `default` when the column does not exist.
    pub fn get_or<'b>(&self, name: &str, default: &'b Value) -> &'b Value
    where
        'a: 'b,
    {
        self.get(name).unwrap_or(default)
    }

    /// Values in column order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Value> + 'a {
        let table = self.table;
        let position = self.position;
        table
            .columns()
            .iter()
            .filter_map(move |column| column.get(position))
    }

    /// Snapshot of the whole row.
    pub fn to_record(&self) -> Record {
        self.table
            .column_names()
            .iter()
            .cloned()
            .zip(self.iter().cloned())
            .collect()
    }

    /// Snapshot restricted to `keys`; keys that are not columns are skipped.
    pub fn to_record_with<S: AsRef<str>>(&self, keys: &[S]) -> Record {
        self.table
            .column_names()
            .iter()
            .zip(self.iter())
            .filter(|(name, _)| keys.iter().any(|key| key.as_ref() == name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

impl fmt::Debug for Row<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("position", &self.position)
            .field("label", self.label())
            .finish()
    }
}

impl fmt::Display for Row<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Row{")?;
        for (idx, (name, value)) in self.table.column_names().iter().zip(self.iter()).enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value:?}")?;
        }
        f.write_str("}")
    }
}

/// Renders column/value pairs as `{A: 1, B: x}` for error and report messages.
pub fn describe_key<S: AsRef<str>>(names: &[S], values: &[Value]) -> String {
    let pairs: Vec<String> = names
        .iter()
        .zip(values)
        .map(|(name, value)| format!("{}: {value}", name.as_ref()))
        .collect();
    format!("{{{}}}", pairs.join(", "))
}

/// Row view that stages writes for its own row.
///
/// Reads see the row's staged writes first. The staged writes are applied to
/// the table by whoever created the view once every row function has returned,
/// so concurrent views never alias a cell.
pub struct RowMut<'a> {
    row: Row<'a>,
    writes: Vec<(usize, Value)>,
}

impl<'a> RowMut<'a> {
    pub fn new(row: Row<'a>) -> Self {
        Self {
            row,
            writes: Vec::new(),
        }
    }

    pub fn position(&self) -> usize {
        self.row.position()
    }

    pub fn label(&self) -> &'a RowLabel {
        self.row.label()
    }

    /// The unmodified row this view was created from.
    pub fn original(&self) -> Row<'a> {
        self.row
    }

    /// Returns `default` when the column does not exist.
    pub fn get_or<'b>(&'b self, name: &str, default: &'b Value) -> &'b Value {
        RowAccess::get(self, name).unwrap_or(default)
    }

    /// Snapshot of the row including staged writes.
    pub fn to_record(&self) -> Record {
        let mut record = self.row.to_record();
        let names = self.row.table().column_names();
        for (position, value) in &self.writes {
            record.insert(names[*position].clone(), value.clone());
        }
        record
    }

    pub fn has_writes(&self) -> bool {
        !self.writes.is_empty()
    }

    /// Consumes the view, returning `(column position, value)` writes in the order made.
    pub fn into_writes(self) -> Vec<(usize, Value)> {
        self.writes
    }
}

impl RowAccess for RowMut<'_> {
    fn get(&self, name: &str) -> Result<&Value> {
        let position = self.row.table().schema().require(name)?;
        if let Some((_, value)) = self.writes.iter().rev().find(|(p, _)| *p == position) {
            return Ok(value);
        }
        self.row.get(name)
    }

    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        let table = self.row.table();
        let position = table.schema().require(name)?;
        let value = match table.column_at(position).and_then(|c| c.dtype()) {
            Some(dtype) => value.cast(dtype).map_err(|source| ModelError::Cast {
                column: name.to_string(),
                source,
            })?,
            None => value,
        };
        self.writes.push((position, value));
        Ok(())
    }
}

impl RowAccess for Record {
    fn get(&self, name: &str) -> Result<&Value> {
        BTreeMap::get(self, name).ok_or_else(|| ModelError::UnknownColumn {
            column: name.to_string(),
            available: self.keys().cloned().collect(),
        })
    }

    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        self.insert(name.to_string(), value);
        Ok(())
    }
}
