//! Schema application: raw records in, typed table out.

use tracing::{debug, trace};

use rpt_model::{Column, FieldOutcome, FieldSchema, ModelError, Record, RowLabel, Table, Value, validate_fields};

use crate::error::{IngestError, Result};

/// Builds a table from raw records under `fields`.
///
/// Each field reads its value from the record (missing keys read as null),
/// runs its transform pipeline, then applies the null policy. A field that
/// ends up null with `filter_if_null` drops the whole record. Columns are
/// cast to their target types once every record has been read.
///
/// # Errors
///
/// Returns [`IngestError::Transform`] for a failing transform step and
/// [`IngestError::Model`] for duplicate field names, cast failures, or an
/// index whose length does not match the surviving rows.
pub fn load_records<I>(records: I, fields: &[FieldSchema], index: Option<Vec<RowLabel>>) -> Result<Table>
where
    I: IntoIterator<Item = Record>,
{
    try_load_records(records.into_iter().map(Ok), fields, index)
}

/// [`load_records`] over a fallible record stream, as produced by the file
/// adapters. The first read error aborts the load.
///
/// # Errors
///
/// Returns the first record error, or any error [`load_records`] can return.
pub fn try_load_records<I>(records: I, fields: &[FieldSchema], index: Option<Vec<RowLabel>>) -> Result<Table>
where
    I: IntoIterator<Item = Result<Record>>,
{
    validate_fields(fields)?;

    let mut buffers: Vec<Vec<Value>> = fields.iter().map(|_| Vec::new()).collect();
    let mut seen = 0usize;
    let mut dropped = 0usize;

    for record in records {
        let record = record?;
        seen += 1;
        match resolve_record(record, fields)? {
            Some(row) => {
                for (buffer, value) in buffers.iter_mut().zip(row) {
                    buffer.push(value);
                }
            }
            None => {
                trace!(record = seen, "record dropped by null filter");
                dropped += 1;
            }
        }
    }

    let columns = fields
        .iter()
        .zip(buffers)
        .map(|(field, values)| match field.target_type() {
            Some(dtype) => Column::typed(field.name(), dtype, values),
            None => Ok(Column::new(field.name(), values)),
        })
        .collect::<std::result::Result<Vec<_>, ModelError>>()?;

    let mut table = Table::new(columns)?;
    if let Some(index) = index {
        table = table.with_index(index)?;
    }

    debug!(
        records = seen,
        dropped,
        rows = table.height(),
        columns = table.width(),
        "applied field schema"
    );
    Ok(table)
}

fn resolve_record(mut record: Record, fields: &[FieldSchema]) -> Result<Option<Vec<Value>>> {
    let mut row = Vec::with_capacity(fields.len());
    for field in fields {
        let raw = record.remove(field.name()).unwrap_or_default();
        let outcome = field.resolve(raw).map_err(|source| IngestError::Transform {
            field: field.name().to_string(),
            source,
        })?;
        match outcome {
            FieldOutcome::Keep(value) => row.push(value),
            FieldOutcome::DropRecord => return Ok(None),
        }
    }
    Ok(Some(row))
}
