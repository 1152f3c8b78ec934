//! Conversion between tables and polars DataFrames.
//!
//! Typed columns map to the matching polars dtype. Untyped and string columns
//! become string columns, with nested values rendered as JSON text.

use polars::prelude::{AnyValue, Column as FrameColumn, DataFrame, NamedFrom, Series};

use rpt_model::{Column, DataType, Table, Value};

use crate::error::Result;

/// Copies `table` into a DataFrame. The row index is not carried over.
///
/// # Errors
///
/// Returns [`crate::IngestError::DataFrame`] if polars rejects the columns.
pub fn table_to_frame(table: &Table) -> Result<DataFrame> {
    let columns: Vec<FrameColumn> = table.columns().iter().map(column_to_frame).collect();
    Ok(DataFrame::new(columns)?)
}

fn column_to_frame(column: &Column) -> FrameColumn {
    let name = column.name();
    let values = column.values();
    let series = match column.dtype() {
        Some(DataType::Int) => {
            let cells: Vec<Option<i64>> = values
                .iter()
                .map(|value| match value {
                    Value::Int(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), cells)
        }
        Some(DataType::Float) => {
            let cells: Vec<Option<f64>> = values
                .iter()
                .map(|value| match value {
                    Value::Float(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), cells)
        }
        Some(DataType::Bool) => {
            let cells: Vec<Option<bool>> = values
                .iter()
                .map(|value| match value {
                    Value::Bool(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), cells)
        }
        Some(DataType::Str | DataType::Any) | None => {
            let cells: Vec<Option<String>> = values
                .iter()
                .map(|value| (!value.is_null()).then(|| value.to_string()))
                .collect();
            Series::new(name.into(), cells)
        }
    };
    series.into()
}

/// Copies a DataFrame into an untyped table with a positional index.
///
/// # Errors
///
/// Returns [`crate::IngestError::DataFrame`] if a cell cannot be read.
pub fn table_from_frame(df: &DataFrame) -> Result<Table> {
    let height = df.height();
    let mut columns = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let mut values = Vec::with_capacity(height);
        for idx in 0..height {
            values.push(any_to_value(column.get(idx)?));
        }
        columns.push(Column::new(column.name().to_string(), values));
    }
    Ok(Table::new(columns)?)
}

fn any_to_value(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::Int8(v) => Value::Int(i64::from(v)),
        AnyValue::Int16(v) => Value::Int(i64::from(v)),
        AnyValue::Int32(v) => Value::Int(i64::from(v)),
        AnyValue::Int64(v) => Value::Int(v),
        AnyValue::UInt8(v) => Value::Int(i64::from(v)),
        AnyValue::UInt16(v) => Value::Int(i64::from(v)),
        AnyValue::UInt32(v) => Value::Int(i64::from(v)),
        AnyValue::UInt64(v) => i64::try_from(v).map_or(Value::Float(v as f64), Value::Int),
        AnyValue::Float32(v) => Value::Float(f64::from(v)),
        AnyValue::Float64(v) => Value::Float(v),
        AnyValue::String(s) => Value::Str(s.to_string()),
        AnyValue::StringOwned(s) => Value::Str(s.to_string()),
        other => Value::Str(other.to_string()),
    }
}
