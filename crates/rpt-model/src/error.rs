use thiserror::Error;

use crate::value::DataType;

/// Errors raised by table construction and row access.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A column name was not found on the table or record.
    #[error("key '{column}' not found on record. Available keys are: {available:?}")]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },

    /// Two columns share the same name.
    #[error("duplicate column name '{column}'")]
    DuplicateColumn { column: String },

    /// A column does not have the same number of cells as the table has rows.
    #[error("column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// The row index does not line up with the row count.
    #[error("row index has {actual} labels, expected {expected}")]
    IndexLength { expected: usize, actual: usize },

    /// A row position past the end of the table.
    #[error("row {row} out of bounds for table with {height} rows")]
    RowOutOfBounds { row: usize, height: usize },

    /// A cell could not be converted to its column type.
    #[error("column '{column}': {source}")]
    Cast {
        column: String,
        #[source]
        source: CastError,
    },
}

/// A value could not be converted to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert {value:?} to {target}")]
pub struct CastError {
    pub value: String,
    pub target: DataType,
}

/// Errors raised by a field transform step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// A nested map did not contain the requested key.
    #[error("key '{key}' not found")]
    MissingKey { key: String },

    /// The value had the wrong shape for the step.
    #[error("expected {expected}, found {found}")]
    UnexpectedType {
        expected: &'static str,
        found: String,
    },

    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
