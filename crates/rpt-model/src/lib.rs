//! Tabular data model for reporting pipelines.
//!
//! - **value**: `Value` cells and `DataType` column tags
//! - **table**: column-oriented `Table` with a per-table `Schema` and row index
//! - **row**: transient `Row`/`RowMut` views and the `Record` mapping
//! - **schema**: `FieldSchema` definitions and `Transform` steps for the loader

pub mod error;
pub mod row;
pub mod schema;
pub mod table;
pub mod value;

pub use error::{CastError, ModelError, Result, TransformError};
pub use row::{Record, Row, RowAccess, RowMut, describe_key};
pub use schema::{FieldOutcome, FieldSchema, Transform, plain_fields, validate_fields};
pub use table::{Column, RowLabel, Schema, Table};
pub use value::{DataType, Value};
