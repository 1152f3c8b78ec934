//! Table transforms for reportkit pipelines.
//!
//! - **expand**: explode nested lists into one row per element
//! - **translate**: lookup-table value substitution
//! - **mapping**: rename, reorder and drop columns
//! - **exclusion**: drop rows listed in an exclusion table

pub mod error;
pub mod exclusion;
pub mod expand;
pub mod mapping;
pub mod translate;

pub use error::{ExclusionError, ExpandError, MappingError, TranslateError};
pub use exclusion::{ExclusionSource, apply_exclusion_list};
pub use expand::{ExpansionPath, ExpansionPlan, PathKey, expand_multivalued};
pub use mapping::{ColumnMapping, apply_mappings};
pub use translate::{
    DEFAULT_MATCH_COLUMN, DEFAULT_REPLACEMENT_COLUMN, TranslationRule, TranslationTable,
    ValueTranslator,
};
