//! Exclusion lists: drop rows whose key tuple appears in another table.

use std::collections::HashSet;

use tracing::{debug, info};

use rpt_ingest::{Source, load_csv};
use rpt_model::{Table, Value};

use crate::error::ExclusionError;

/// Where the excluded key tuples come from.
#[derive(Debug, Clone, Copy)]
pub enum ExclusionSource<'a> {
    Table(&'a Table),
    /// A CSV file, read with every column as text.
    Csv(&'a Source),
}

impl<'a> From<&'a Table> for ExclusionSource<'a> {
    fn from(table: &'a Table) -> Self {
        Self::Table(table)
    }
}

impl<'a> From<&'a Source> for ExclusionSource<'a> {
    fn from(source: &'a Source) -> Self {
        Self::Csv(source)
    }
}

/// Removes every row of `table` whose values in the target columns equal the
/// exclusion columns of some exclusion row. `match_pairs` holds
/// `(target column, exclusion column)` pairs. Surviving rows keep their index
/// labels. Returns the number of rows removed.
///
/// # Errors
///
/// An empty pair list or a column missing from either table is reported
/// before any row is compared.
pub fn apply_exclusion_list<'a, S, E>(
    table: &mut Table,
    exclusions: impl Into<ExclusionSource<'a>>,
    match_pairs: &[(S, E)],
) -> Result<usize, ExclusionError>
where
    S: AsRef<str>,
    E: AsRef<str>,
{
    if match_pairs.is_empty() {
        return Err(ExclusionError::NoMatchPairs);
    }

    let loaded;
    let exclusions = match exclusions.into() {
        ExclusionSource::Table(listed) => listed,
        ExclusionSource::Csv(source) => {
            loaded = load_csv(source, None, None)?;
            &loaded
        }
    };

    let mut target_positions = Vec::with_capacity(match_pairs.len());
    let mut exclusion_positions = Vec::with_capacity(match_pairs.len());
    for (target, excluded) in match_pairs {
        let target = target.as_ref();
        let excluded = excluded.as_ref();
        target_positions.push(table.schema().position(target).ok_or_else(|| {
            ExclusionError::UnknownTargetColumn {
                column: target.to_string(),
            }
        })?);
        exclusion_positions.push(exclusions.schema().position(excluded).ok_or_else(|| {
            ExclusionError::UnknownExclusionColumn {
                column: excluded.to_string(),
            }
        })?);
    }

    let excluded: HashSet<Vec<Value>> = (0..exclusions.height())
        .map(|row| exclusions.key_tuple(row, &exclusion_positions))
        .collect();
    debug!(keys = excluded.len(), "built exclusion key set");

    let keep: Vec<bool> = (0..table.height())
        .map(|row| !excluded.contains(&table.key_tuple(row, &target_positions)))
        .collect();
    let removed = table.retain_rows(&keep)?;
    info!(removed, remaining = table.height(), "applied exclusion list");
    Ok(removed)
}
