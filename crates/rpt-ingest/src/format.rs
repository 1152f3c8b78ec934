//! File format detection by extension.

use std::fmt;
use std::path::Path;

use rpt_model::{FieldSchema, Table};

use crate::csv_file::{load_csv, save_csv_path};
use crate::error::{IngestError, Result};
use crate::jsonl::{load_jsonl, load_jsonl_inferred, save_jsonl_path};
use crate::source::Source;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    JsonLines,
}

impl FileFormat {
    /// Detects the format from the file extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("jsonl" | "ndjson") => Ok(Self::JsonLines),
            _ => Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => f.write_str("CSV"),
            Self::JsonLines => f.write_str("JSON-lines"),
        }
    }
}

/// Loads a table from `path` in the format its extension names.
///
/// Without `fields`, CSV uses the header row and JSON lines use every key
/// that appears in the file.
///
/// # Errors
///
/// Returns [`IngestError::UnsupportedFormat`] or any reader error.
pub fn read_table(path: &Path, fields: Option<&[FieldSchema]>) -> Result<Table> {
    let source = Source::from_path(path);
    match (FileFormat::from_path(path)?, fields) {
        (FileFormat::Csv, fields) => load_csv(&source, fields, None),
        (FileFormat::JsonLines, Some(fields)) => load_jsonl(&source, fields, None),
        (FileFormat::JsonLines, None) => load_jsonl_inferred(&source),
    }
}

/// Writes `table` to `path` in the format its extension names.
///
/// # Errors
///
/// Returns [`IngestError::UnsupportedFormat`] or any writer error.
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    match FileFormat::from_path(path)? {
        FileFormat::Csv => save_csv_path(table, path),
        FileFormat::JsonLines => save_jsonl_path(table, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_known_extensions() {
        assert_eq!(FileFormat::from_path(Path::new("a/b.CSV")).unwrap(), FileFormat::Csv);
        assert_eq!(
            FileFormat::from_path(Path::new("rows.ndjson")).unwrap(),
            FileFormat::JsonLines
        );
        assert!(FileFormat::from_path(Path::new("rows.xlsx")).is_err());
        assert!(FileFormat::from_path(Path::new("no_extension")).is_err());
    }
}
