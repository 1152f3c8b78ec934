//! Referential integrity between two tables.

use std::collections::HashSet;

use tracing::{debug, info};

use rpt_model::{Table, Value, describe_key};
use rpt_parallel::map_rows;

use crate::error::{Result, ValidateError};
use crate::failure::FailureRecord;

/// Reports every row of `left` whose `left_keys` values have no equal
/// `right_keys` row in `right`.
///
/// With `ignore_blanks`, rows whose left keys are all empty strings pass.
/// Failures come in left-table row order and carry the left key fields.
///
/// # Errors
///
/// Returns [`ValidateError::NoKeys`], [`ValidateError::KeyCountMismatch`] or
/// an unknown-column error. Missing references are failures, not errors.
pub fn xref_integrity<L, R>(
    left: &Table,
    left_keys: &[L],
    right: &Table,
    right_keys: &[R],
    ignore_blanks: bool,
) -> Result<Vec<FailureRecord>>
where
    L: AsRef<str>,
    R: AsRef<str>,
{
    if left_keys.is_empty() || right_keys.is_empty() {
        return Err(ValidateError::NoKeys {
            check: "xref_integrity",
        });
    }
    if left_keys.len() != right_keys.len() {
        return Err(ValidateError::KeyCountMismatch {
            left: left_keys.len(),
            right: right_keys.len(),
        });
    }
    let left_positions = left.schema().require_all(left_keys)?;
    let right_positions = right.schema().require_all(right_keys)?;

    let left_names: Vec<&str> = left_keys.iter().map(AsRef::as_ref).collect();
    let right_names: Vec<&str> = right_keys.iter().map(AsRef::as_ref).collect();
    let check = format!("xref_integrity[{} == {}]", left_names.join(","), right_names.join(","));

    let present: HashSet<Vec<Value>> = (0..right.height())
        .map(|row| right.key_tuple(row, &right_positions))
        .collect();
    debug!(check = %check, right_keys = present.len(), "indexed right-hand keys");

    let failures = map_rows(left, |row| -> Result<Option<FailureRecord>> {
        let key = left.key_tuple(row.position(), &left_positions);
        if present.contains(&key) || (ignore_blanks && key.iter().all(Value::is_blank)) {
            return Ok(None);
        }
        Ok(Some(FailureRecord {
            check: check.clone(),
            message: format!("Missing right-hand record matching: {}", describe_key(&right_names, &key)),
            fields: left_names
                .iter()
                .map(|name| (*name).to_string())
                .zip(key)
                .collect(),
        }))
    })?;

    let failures: Vec<FailureRecord> = failures.into_iter().flatten().collect();
    info!(check = %check, rows = left.height(), failures = failures.len(), "xref check complete");
    Ok(failures)
}
