//! Error types for table transforms.
//!
//! Configuration problems (bad paths, unknown or duplicate columns) are raised
//! before any row is touched. Data problems carry the row or key that failed.

use rpt_ingest::IngestError;
use rpt_model::ModelError;
use thiserror::Error;

/// Errors from multi-valued expansion.
#[derive(Debug, Error)]
pub enum ExpandError {
    // === Configuration ===
    #[error("key path '{path}' must contain a wildcard")]
    MissingWildcard { path: String },

    #[error("key path '{path}' contains {count} wildcards, expected exactly one")]
    ExtraWildcards { path: String, count: usize },

    #[error("invalid expansion path '{text}': {reason}")]
    InvalidPath { text: String, reason: &'static str },

    #[error("expansion plan has no paths")]
    EmptyPlan,

    #[error("expansion path for '{target}' reads unknown column '{column}'")]
    UnknownColumn { target: String, column: String },

    // === Data ===
    /// A value along the key path had the wrong shape.
    #[error("row {row}, column '{target}': expected {expected} at '{step}', found {found}")]
    Shape {
        row: String,
        target: String,
        step: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Errors from value translation.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("translation rule needs at least one match column")]
    NoMatchColumns,

    #[error("translation rule over {columns:?} has a key with {actual} values, expected {expected}")]
    KeyWidth {
        columns: Vec<String>,
        expected: usize,
        actual: usize,
    },

    /// A strict table had no entry for the row's match values.
    #[error("translation lookup failed: table contains no key matching {key}")]
    LookupMiss { key: String },

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Errors from column mappings.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("mapping index {ordinal} appears more than once")]
    DuplicateOrdinal { ordinal: u32 },

    #[error("column not found in table: '{column}'")]
    UnknownColumn { column: String },

    #[error("destination column '{column}' appears more than once")]
    DuplicateDestination { column: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Errors from exclusion lists.
#[derive(Debug, Error)]
pub enum ExclusionError {
    #[error("exclusion list needs at least one match pair")]
    NoMatchPairs,

    #[error("column '{column}' doesn't exist in the target table")]
    UnknownTargetColumn { column: String },

    #[error("column '{column}' doesn't exist in the exclusion list")]
    UnknownExclusionColumn { column: String },

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Model(#[from] ModelError),
}
