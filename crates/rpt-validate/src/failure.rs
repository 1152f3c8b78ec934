//! The uniform output of every check.

use serde::Serialize;

use rpt_model::{Column, Table, Value};

use crate::error::Result;

/// One finding: which check produced it, what is wrong, and the row's fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub check: String,
    pub message: String,
    pub fields: Vec<(String, Value)>,
}

impl FailureRecord {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// `[check, message, field values...]` as plain values.
    pub fn to_values(&self) -> Vec<Value> {
        let mut values = Vec::with_capacity(self.fields.len() + 2);
        values.push(Value::from(self.check.as_str()));
        values.push(Value::from(self.message.as_str()));
        values.extend(self.fields.iter().map(|(_, value)| value.clone()));
        values
    }
}

/// Collects failures from one check into a table with `check` and `message`
/// columns followed by the field columns of the first failure.
///
/// # Errors
///
/// Returns a model error if the failures do not share one field layout.
pub fn failures_to_table(failures: &[FailureRecord]) -> Result<Table> {
    let mut names = vec!["check".to_string(), "message".to_string()];
    if let Some(first) = failures.first() {
        names.extend(first.fields.iter().map(|(name, _)| name.clone()));
    }
    let mut columns: Vec<Vec<Value>> = names.iter().map(|_| Vec::with_capacity(failures.len())).collect();
    for failure in failures {
        for (column, value) in columns.iter_mut().zip(failure.to_values()) {
            column.push(value);
        }
    }
    let table = Table::new(
        names
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Column::new(name, values))
            .collect(),
    )?;
    Ok(table)
}
