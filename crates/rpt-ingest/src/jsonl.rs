//! JSON-lines reader and writer: one object per line.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use tracing::info;

use rpt_model::{FieldSchema, Record, Row, RowLabel, Table, Value, plain_fields};

use crate::error::{IngestError, Result};
use crate::loader::{load_records, try_load_records};
use crate::source::Source;

/// Loads a JSON-lines source into a table. Blank lines are skipped.
///
/// # Errors
///
/// Returns [`IngestError::Json`] or [`IngestError::NotAnObject`] for a bad
/// line, or any loader error.
pub fn load_jsonl(source: &Source, fields: &[FieldSchema], index: Option<Vec<RowLabel>>) -> Result<Table> {
    info!(source = %source, "loading JSON-lines records");
    let table = try_load_records(read_lines(source)?, fields, index)?;
    info!(source = %source, rows = table.height(), "loaded JSON-lines records");
    Ok(table)
}

/// Loads a JSON-lines source with one untyped field per key seen on any line.
///
/// Columns come out in key order since JSON objects carry no column order.
///
/// # Errors
///
/// Same as [`load_jsonl`].
pub fn load_jsonl_inferred(source: &Source) -> Result<Table> {
    info!(source = %source, "loading JSON-lines records with inferred fields");
    let records = read_lines(source)?.collect::<Result<Vec<Record>>>()?;
    let keys: BTreeSet<&str> = records
        .iter()
        .flat_map(|record| record.keys().map(String::as_str))
        .collect();
    let fields = plain_fields(&keys.into_iter().collect::<Vec<_>>());
    let table = load_records(records, &fields, None)?;
    info!(source = %source, rows = table.height(), "loaded JSON-lines records");
    Ok(table)
}

fn read_lines(source: &Source) -> Result<impl Iterator<Item = Result<Record>> + '_> {
    let origin = source.to_string();
    let reader = BufReader::new(source.open()?);
    Ok(reader
        .lines()
        .enumerate()
        .filter_map(move |(idx, line)| match line {
            Err(source) => Some(Err(IngestError::Read {
                origin: origin.clone(),
                source,
            })),
            Ok(text) if text.trim().is_empty() => None,
            Ok(text) => Some(parse_line(&text, &origin, idx + 1)),
        }))
}

fn parse_line(text: &str, origin: &str, line: usize) -> Result<Record> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|source| IngestError::Json {
        origin: origin.to_string(),
        line,
        source,
    })?;
    match value {
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, value)| (key, Value::from(value)))
            .collect()),
        _ => Err(IngestError::NotAnObject {
            origin: origin.to_string(),
            line,
        }),
    }
}

/// Serializes one row as a JSON object in column order.
struct JsonRow<'a>(Row<'a>);

impl Serialize for JsonRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let names = self.0.table().column_names();
        let mut map = serializer.serialize_map(Some(names.len()))?;
        for (name, value) in names.iter().zip(self.0.iter()) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Writes `table` as JSON lines, one compact object per row.
///
/// # Errors
///
/// Returns [`IngestError::Write`] if writing fails.
pub fn save_jsonl<W: Write>(table: &Table, writer: W) -> Result<()> {
    info!(rows = table.height(), "writing JSON-lines records");
    let origin = "JSON-lines output";
    let write_error = |source: std::io::Error| IngestError::Write {
        origin: origin.to_string(),
        source,
    };

    let mut writer = BufWriter::new(writer);
    for row in table.rows() {
        serde_json::to_writer(&mut writer, &JsonRow(row)).map_err(|err| write_error(err.into()))?;
        writer.write_all(b"\n").map_err(write_error)?;
    }
    writer.flush().map_err(write_error)?;
    info!("JSON-lines output completed");
    Ok(())
}

/// [`save_jsonl`] into a newly created file.
///
/// # Errors
///
/// Returns [`IngestError::Write`] if the file cannot be created.
pub fn save_jsonl_path(table: &Table, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|source| IngestError::Write {
        origin: path.display().to_string(),
        source,
    })?;
    save_jsonl(table, file)
}
