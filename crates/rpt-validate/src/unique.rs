//! Duplicate key detection.

use std::collections::HashMap;

use tracing::info;

use rpt_model::{Table, Value};
use rpt_parallel::map_rows;

use crate::error::{Result, ValidateError};
use crate::failure::FailureRecord;

/// Reports every row whose key tuple occurs more than once, including the
/// first occurrence. With `keys` of `None` the whole row is the key.
///
/// # Errors
///
/// Returns [`ValidateError::NoKeys`] for an empty key list or an
/// unknown-column error.
pub fn unique_keys<S>(table: &Table, keys: Option<&[S]>) -> Result<Vec<FailureRecord>>
where
    S: AsRef<str> + Sync,
{
    let (positions, check) = match keys {
        Some([]) => return Err(ValidateError::NoKeys { check: "unique_keys" }),
        Some(keys) => {
            let names: Vec<&str> = keys.iter().map(AsRef::as_ref).collect();
            (table.schema().require_all(keys)?, format!("unique_keys[{}]", names.join(",")))
        }
        None => ((0..table.width()).collect::<Vec<_>>(), "unique_keys[*]".to_string()),
    };

    let mut counts: HashMap<Vec<Value>, usize> = HashMap::new();
    for row in 0..table.height() {
        *counts.entry(table.key_tuple(row, &positions)).or_default() += 1;
    }

    let failures = map_rows(table, |row| -> Result<Option<FailureRecord>> {
        let key = table.key_tuple(row.position(), &positions);
        if counts.get(&key).copied().unwrap_or(0) < 2 {
            return Ok(None);
        }
        let message = if keys.is_some() {
            let values: Vec<String> = key.iter().map(ToString::to_string).collect();
            format!("duplicate keys: [{}]", values.join(", "))
        } else {
            "duplicate row".to_string()
        };
        let fields = table
            .column_names()
            .iter()
            .cloned()
            .zip(row.iter().cloned())
            .collect();
        Ok(Some(FailureRecord {
            check: check.clone(),
            message,
            fields,
        }))
    })?;

    let failures: Vec<FailureRecord> = failures.into_iter().flatten().collect();
    info!(check = %check, rows = table.height(), failures = failures.len(), "uniqueness check complete");
    Ok(failures)
}
