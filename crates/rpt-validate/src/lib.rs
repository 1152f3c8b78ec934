//! Cross-table checks for reportkit.
//!
//! Checks return a list of [`FailureRecord`]s; an empty list means the check
//! passed. An `Err` means the check could not run at all.

pub mod error;
pub mod failure;
pub mod unique;
pub mod xref;

pub use error::{Result, ValidateError};
pub use failure::{FailureRecord, failures_to_table};
pub use unique::unique_keys;
pub use xref::xref_integrity;
