//! Column mappings: rename, reorder and drop in one step.

use std::collections::HashSet;

use tracing::info;

use rpt_model::Table;

use crate::error::MappingError;

/// `(ordinal, source, destination)`: output position, input column, new name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub ordinal: u32,
    pub source: String,
    pub destination: String,
}

impl ColumnMapping {
    pub fn new(ordinal: u32, source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            ordinal,
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// Renames and reorders the columns of `table` by ascending ordinal. Columns
/// not named by any mapping are dropped. Row order and index are kept.
///
/// # Errors
///
/// Duplicate ordinals, unknown source columns and duplicate destinations are
/// all reported before the table is modified.
pub fn apply_mappings(table: &mut Table, mappings: &[ColumnMapping]) -> Result<(), MappingError> {
    let mut ordered: Vec<&ColumnMapping> = mappings.iter().collect();
    ordered.sort_by_key(|mapping| mapping.ordinal);

    if let Some(pair) = ordered.windows(2).find(|pair| pair[0].ordinal == pair[1].ordinal) {
        return Err(MappingError::DuplicateOrdinal {
            ordinal: pair[0].ordinal,
        });
    }

    if let Some(mapping) = ordered
        .iter()
        .find(|mapping| !table.schema().contains(&mapping.source))
    {
        return Err(MappingError::UnknownColumn {
            column: mapping.source.clone(),
        });
    }

    let mut destinations = HashSet::new();
    if let Some(mapping) = ordered
        .iter()
        .find(|mapping| !destinations.insert(mapping.destination.as_str()))
    {
        return Err(MappingError::DuplicateDestination {
            column: mapping.destination.clone(),
        });
    }

    let plan: Vec<(&str, &str)> = ordered
        .iter()
        .map(|mapping| (mapping.source.as_str(), mapping.destination.as_str()))
        .collect();
    let dropped = table.width().saturating_sub(plan.len());
    table.rename_and_reorder(&plan)?;
    info!(columns = plan.len(), dropped, "applied column mappings");
    Ok(())
}
