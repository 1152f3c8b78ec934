//! CSV reader and writer.
//!
//! Reading is strict: a row whose field count differs from the header is an
//! error, never padded or truncated, and so is a quoted field with trailing
//! text (`"x"y`) or no closing quote.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use tracing::info;

use rpt_model::{DataType, FieldSchema, Record, RowLabel, Table, Value};

use crate::error::{IngestError, Result};
use crate::loader::try_load_records;
use crate::source::Source;

/// Loads a CSV source into a table.
///
/// Without `fields`, every header column becomes a string field with no
/// transforms. Header columns not named by `fields` are ignored.
///
/// # Errors
///
/// Returns [`IngestError::Csv`] or [`IngestError::CsvQuoting`] for malformed
/// input, or any loader error.
pub fn load_csv(source: &Source, fields: Option<&[FieldSchema]>, index: Option<Vec<RowLabel>>) -> Result<Table> {
    info!(source = %source, "loading CSV records");
    let origin = source.to_string();

    let mut bytes = Vec::new();
    source
        .open()?
        .read_to_end(&mut bytes)
        .map_err(|source| IngestError::Read {
            origin: origin.clone(),
            source,
        })?;
    check_quoting(&bytes, &origin)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes.as_slice());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| IngestError::Csv {
            origin: origin.clone(),
            source,
        })?
        .iter()
        .map(str::to_string)
        .collect();

    let default_fields;
    let fields = match fields {
        Some(fields) => fields,
        None => {
            default_fields = default_schema(&headers);
            &default_fields
        }
    };

    let records = reader.into_records().map(|record| {
        let record = record.map_err(|source| IngestError::Csv {
            origin: origin.clone(),
            source,
        })?;
        Ok(headers
            .iter()
            .cloned()
            .zip(record.iter().map(Value::from))
            .collect::<Record>())
    });

    let table = try_load_records(records, fields, index)?;
    info!(source = %source, rows = table.height(), "loaded CSV records");
    Ok(table)
}

/// Rejects quoting the `csv` reader would silently repair. Inside quotes a
/// doubled quote is an escaped quote; the closing quote must be followed by a
/// delimiter, a line end or the end of input.
fn check_quoting(bytes: &[u8], origin: &str) -> Result<()> {
    let quoting_error = |line: usize, reason: &'static str| IngestError::CsvQuoting {
        origin: origin.to_string(),
        line,
        reason,
    };
    let mut line = 1;
    let mut field_start = true;
    let mut opened_on: Option<usize> = None;
    let mut bytes = bytes.iter().copied().peekable();

    while let Some(byte) = bytes.next() {
        if opened_on.is_some() {
            match byte {
                b'"' if bytes.peek() == Some(&b'"') => {
                    bytes.next();
                }
                b'"' => {
                    opened_on = None;
                    if !matches!(bytes.peek(), None | Some(b',' | b'\n' | b'\r')) {
                        return Err(quoting_error(line, "closing quote must end the field"));
                    }
                }
                b'\n' => line += 1,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' if field_start => {
                opened_on = Some(line);
                field_start = false;
            }
            b'\n' => {
                line += 1;
                field_start = true;
            }
            b',' | b'\r' => field_start = true,
            _ => field_start = false,
        }
    }
    match opened_on {
        Some(opened) => Err(quoting_error(opened, "quoted field is never closed")),
        None => Ok(()),
    }
}

/// One string-typed, transform-free field per header column.
pub fn default_schema<S: AsRef<str>>(headers: &[S]) -> Vec<FieldSchema> {
    headers
        .iter()
        .map(|header| FieldSchema::typed(header.as_ref(), DataType::Str))
        .collect()
}

/// Writes `table` as CSV with a header row and without the row index.
///
/// Nulls are written as empty fields; nested values as compact JSON.
///
/// # Errors
///
/// Returns [`IngestError::Csv`] or [`IngestError::Write`] if writing fails.
pub fn save_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    info!(rows = table.height(), "writing CSV records");
    let origin = "CSV output";
    let mut writer = WriterBuilder::new().from_writer(writer);
    let csv_error = |source: csv::Error| IngestError::Csv {
        origin: origin.to_string(),
        source,
    };

    if table.width() > 0 {
        writer.write_record(table.column_names()).map_err(csv_error)?;
        for row in table.rows() {
            writer
                .write_record(row.iter().map(ToString::to_string))
                .map_err(csv_error)?;
        }
    }
    writer.flush().map_err(|source| IngestError::Write {
        origin: origin.to_string(),
        source,
    })?;
    info!("CSV output completed");
    Ok(())
}

/// [`save_csv`] into a newly created file.
///
/// # Errors
///
/// Returns [`IngestError::Write`] if the file cannot be created.
pub fn save_csv_path(table: &Table, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|source| IngestError::Write {
        origin: path.display().to_string(),
        source,
    })?;
    save_csv(table, file)
}
