//! Column-oriented table with an explicit name lookup and row index.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::row::Row;
use crate::value::{DataType, Value};

/// Row label carried through filtering operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowLabel {
    Int(i64),
    Text(String),
}

impl fmt::Display for RowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RowLabel {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for RowLabel {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

fn positional_index(height: usize) -> Vec<RowLabel> {
    (0..height)
        .map(|idx| RowLabel::Int(i64::try_from(idx).unwrap_or(i64::MAX)))
        .collect()
}

/// A named, optionally typed column of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    dtype: Option<DataType>,
    values: Vec<Value>,
}

impl Column {
    /// Creates an untyped column.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            dtype: None,
            values,
        }
    }

    /// Creates a column and casts every cell to `dtype`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Cast`] naming the column when any cell fails to convert.
    pub fn typed(name: impl Into<String>, dtype: DataType, values: Vec<Value>) -> Result<Self> {
        let name = name.into();
        let values = values
            .into_iter()
            .map(|value| value.cast(dtype))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|source| ModelError::Cast {
                column: name.clone(),
                source,
            })?;
        Ok(Self {
            name,
            dtype: Some(dtype),
            values,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> Option<DataType> {
        self.dtype
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    fn coerce(&self, value: Value) -> Result<Value> {
        match self.dtype {
            Some(dtype) => value.cast(dtype).map_err(|source| ModelError::Cast {
                column: self.name.clone(),
                source,
            }),
            None => Ok(value),
        }
    }
}

/// Name to position lookup for a table's columns.
///
/// Each table owns its own schema; nothing is shared between tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Schema {
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateColumn`] when a name repeats.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut schema = Self::default();
        for name in names {
            let name = name.into();
            if schema.positions.contains_key(&name) {
                return Err(ModelError::DuplicateColumn { column: name });
            }
            schema.positions.insert(name.clone(), schema.names.len());
            schema.names.push(name);
        }
        Ok(schema)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Resolves a column name, failing with the list of available names.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownColumn`] when the name is not present.
    pub fn require(&self, name: &str) -> Result<usize> {
        self.position(name).ok_or_else(|| ModelError::UnknownColumn {
            column: name.to_string(),
            available: self.names.clone(),
        })
    }

    /// Resolves several names at once, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownColumn`] for the first missing name.
    pub fn require_all<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>> {
        names.iter().map(|name| self.require(name.as_ref())).collect()
    }
}

/// Ordered, named columns of equal length plus a row index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<Column>,
    schema: Schema,
    index: Vec<RowLabel>,
}

impl Table {
    /// Builds a table with a positional `0..N` index.
    ///
    /// # Errors
    ///
    /// Fails when column names repeat or column lengths differ.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let schema = Schema::new(columns.iter().map(|column| column.name.clone()))?;
        let height = columns.first().map_or(0, Column::len);
        for column in &columns {
            if column.len() != height {
                return Err(ModelError::LengthMismatch {
                    column: column.name.clone(),
                    expected: height,
                    actual: column.len(),
                });
            }
        }
        Ok(Self {
            columns,
            schema,
            index: positional_index(height),
        })
    }

    /// Builds an untyped table from row-major values.
    ///
    /// # Errors
    ///
    /// Fails when a row does not have one value per column name.
    pub fn from_rows<S: Into<String>>(names: Vec<S>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut buffers: Vec<Vec<Value>> = names
            .iter()
            .map(|_| Vec::with_capacity(rows.len()))
            .collect();
        for row in rows {
            if row.len() != names.len() {
                return Err(ModelError::LengthMismatch {
                    column: "<row>".to_string(),
                    expected: names.len(),
                    actual: row.len(),
                });
            }
            for (buffer, value) in buffers.iter_mut().zip(row) {
                buffer.push(value);
            }
        }
        let columns = names
            .into_iter()
            .zip(buffers)
            .map(|(name, values)| Column::new(name, values))
            .collect();
        Self::new(columns)
    }

    /// Replaces the positional index with explicit labels.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IndexLength`] when the label count differs from the row count.
    pub fn with_index(mut self, index: Vec<RowLabel>) -> Result<Self> {
        if index.len() != self.height() {
            return Err(ModelError::IndexLength {
                expected: self.height(),
                actual: index.len(),
            });
        }
        self.index = index;
        Ok(self)
    }

    pub fn height(&self) -> usize {
        self.index.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn column_names(&self) -> &[String] {
        self.schema.names()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn index(&self) -> &[RowLabel] {
        &self.index
    }

    /// # Errors
    ///
    /// Returns [`ModelError::UnknownColumn`] when the column is missing.
    pub fn column(&self, name: &str) -> Result<&Column> {
        let position = self.schema.require(name)?;
        Ok(&self.columns[position])
    }

    /// # Errors
    ///
    /// Returns [`ModelError::UnknownColumn`] when the column is missing.
    pub fn column_values(&self, name: &str) -> Result<&[Value]> {
        self.column(name).map(Column::values)
    }

    pub fn column_at(&self, position: usize) -> Option<&Column> {
        self.columns.get(position)
    }

    /// Reads a cell by row position and column position.
    pub fn value_at(&self, row: usize, column: usize) -> Option<&Value> {
        self.columns.get(column).and_then(|c| c.get(row))
    }

    /// # Errors
    ///
    /// Fails on an unknown column or an out-of-range row.
    pub fn cell(&self, row: usize, name: &str) -> Result<&Value> {
        let position = self.schema.require(name)?;
        self.value_at(row, position)
            .ok_or(ModelError::RowOutOfBounds {
                row,
                height: self.height(),
            })
    }

    /// Overwrites a cell, casting to the column type when one is set.
    ///
    /// # Errors
    ///
    /// Fails on an unknown column, an out-of-range row or a cast failure.
    pub fn set_cell(&mut self, row: usize, name: &str, value: Value) -> Result<()> {
        let position = self.schema.require(name)?;
        self.set_cell_at(row, position, value)
    }

    /// Overwrites a cell by column position.
    ///
    /// # Errors
    ///
    /// Fails on an out-of-range row or column, or a cast failure.
    pub fn set_cell_at(&mut self, row: usize, column: usize, value: Value) -> Result<()> {
        let height = self.height();
        let Some(target) = self.columns.get_mut(column) else {
            return Err(ModelError::UnknownColumn {
                column: format!("#{column}"),
                available: self.schema.names().to_vec(),
            });
        };
        let value = target.coerce(value)?;
        let slot = target
            .values
            .get_mut(row)
            .ok_or(ModelError::RowOutOfBounds { row, height })?;
        *slot = value;
        Ok(())
    }

    pub fn row(&self, position: usize) -> Option<Row<'_>> {
        (position < self.height()).then(|| Row::new(self, position))
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.height()).map(move |position| Row::new(self, position))
    }

    /// Clones the values at `positions` for one row.
    pub fn key_tuple(&self, row: usize, positions: &[usize]) -> Vec<Value> {
        positions
            .iter()
            .map(|&column| self.value_at(row, column).cloned().unwrap_or_default())
            .collect()
    }

    /// Appends a column.
    ///
    /// # Errors
    ///
    /// Fails when the name already exists or the length differs from the row count.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if self.schema.contains(&column.name) {
            return Err(ModelError::DuplicateColumn {
                column: column.name,
            });
        }
        if self.columns.is_empty() && self.index.is_empty() {
            self.index = positional_index(column.len());
        } else if column.len() != self.height() {
            let actual = column.len();
            return Err(ModelError::LengthMismatch {
                column: column.name,
                expected: self.height(),
                actual,
            });
        }
        self.schema = Schema::new(
            self.schema
                .names()
                .iter()
                .cloned()
                .chain(std::iter::once(column.name.clone())),
        )?;
        self.columns.push(column);
        Ok(())
    }

    /// Projects the table onto `names`, keeping the row index.
    ///
    /// # Errors
    ///
    /// Fails on an unknown or repeated column name.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let positions = self.schema.require_all(names)?;
        let columns: Vec<Column> = positions
            .into_iter()
            .map(|position| self.columns[position].clone())
            .collect();
        let schema = Schema::new(columns.iter().map(|column| column.name.clone()))?;
        Ok(Self {
            columns,
            schema,
            index: self.index.clone(),
        })
    }

    /// Keeps the rows whose mask entry is `true`; surviving rows keep their labels.
    ///
    /// Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::LengthMismatch`] when the mask does not cover every row.
    pub fn retain_rows(&mut self, keep: &[bool]) -> Result<usize> {
        if keep.len() != self.height() {
            return Err(ModelError::LengthMismatch {
                column: "<mask>".to_string(),
                expected: self.height(),
                actual: keep.len(),
            });
        }
        let before = self.height();
        for column in &mut self.columns {
            let mut flags = keep.iter();
            column.values.retain(|_| flags.next().copied().unwrap_or(false));
        }
        let mut flags = keep.iter();
        self.index.retain(|_| flags.next().copied().unwrap_or(false));
        Ok(before - self.height())
    }

    /// Renames columns and reorders them to match `plan`, dropping unlisted columns.
    ///
    /// `plan` is a list of `(source, destination)` pairs in output order. The table
    /// is left untouched when the plan references an unknown column or would produce
    /// duplicate names.
    ///
    /// # Errors
    ///
    /// Fails on an unknown source column or a duplicate destination.
    pub fn rename_and_reorder<S: AsRef<str>, D: AsRef<str>>(&mut self, plan: &[(S, D)]) -> Result<()> {
        let positions: Vec<usize> = plan
            .iter()
            .map(|(source, _)| self.schema.require(source.as_ref()))
            .collect::<Result<_>>()?;
        let schema = Schema::new(plan.iter().map(|(_, dest)| dest.as_ref().to_string()))?;
        self.columns = positions
            .into_iter()
            .zip(plan)
            .map(|(position, (_, dest))| {
                let mut column = self.columns[position].clone();
                column.name = dest.as_ref().to_string();
                column
            })
            .collect();
        self.schema = schema;
        Ok(())
    }
}
