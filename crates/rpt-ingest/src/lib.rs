//! Record ingestion for reportkit.
//!
//! [`load_records`] turns raw name→value records into a typed [`Table`] under
//! a list of [`FieldSchema`]s. The CSV and JSON-lines adapters parse their
//! input into records and delegate to it; the writers emit the same formats.
//!
//! [`Table`]: rpt_model::Table
//! [`FieldSchema`]: rpt_model::FieldSchema

pub mod csv_file;
pub mod error;
pub mod format;
pub mod frame;
pub mod jsonl;
pub mod loader;
pub mod source;

pub use csv_file::{default_schema, load_csv, save_csv, save_csv_path};
pub use error::{IngestError, Result};
pub use format::{FileFormat, read_table, write_table};
pub use frame::{table_from_frame, table_to_frame};
pub use jsonl::{load_jsonl, load_jsonl_inferred, save_jsonl, save_jsonl_path};
pub use loader::{load_records, try_load_records};
pub use source::Source;
