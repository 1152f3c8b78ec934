//! Error types for record ingestion.

use std::path::PathBuf;

use rpt_model::{ModelError, TransformError};
use thiserror::Error;

/// Errors that can occur while loading or saving tables.
#[derive(Debug, Error)]
pub enum IngestError {
    // === Input / Output ===
    /// Failed to open or read an input.
    #[error("failed to read {origin}: {source}")]
    Read {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an output.
    #[error("failed to write {origin}: {source}")]
    Write {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    /// The file extension does not name a supported format.
    #[error("unsupported file format: {path}")]
    UnsupportedFormat { path: PathBuf },

    // === Parsing ===
    /// Malformed CSV, including rows whose field count differs from the header.
    #[error("malformed CSV in {origin}: {source}")]
    Csv {
        origin: String,
        #[source]
        source: csv::Error,
    },

    /// A quoted CSV field is followed by something other than a delimiter or
    /// line end, or is never closed.
    #[error("malformed CSV quoting on line {line} of {origin}: {reason}")]
    CsvQuoting {
        origin: String,
        line: usize,
        reason: &'static str,
    },

    /// A JSON-lines line is not valid JSON.
    #[error("invalid JSON on line {line} of {origin}: {source}")]
    Json {
        origin: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A JSON-lines line holds something other than an object.
    #[error("line {line} of {origin} is not a JSON object")]
    NotAnObject { origin: String, line: usize },

    // === Schema Application ===
    /// A field's transform pipeline failed.
    #[error("field '{field}': {source}")]
    Transform {
        field: String,
        #[source]
        source: TransformError,
    },

    /// Table construction or a column cast failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    // === DataFrame Interop ===
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
