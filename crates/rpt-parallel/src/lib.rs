//! Row-parallel mapping over tables.
//!
//! Row functions run on a rayon pool, one task per row index. Two modes:
//!
//! - **collect** ([`map_rows`], [`RowMapper::map`]): gather each row function's
//!   `Option<T>` into a vector in row order. `None` results stay in place.
//! - **mutate** ([`apply_rows`], [`RowMapper::apply`]): each row function
//!   receives a [`RowMut`] and stages writes for its own row. Writes are applied
//!   after every row function has returned, then the table is handed back.
//!
//! Row functions must only depend on their own row. There is no cancellation:
//! a row function that never returns blocks the whole call.

use rayon::prelude::{IntoParallelIterator, ParallelIterator};
use rayon::{ThreadPool, ThreadPoolBuilder};
use thiserror::Error;
use tracing::debug;

use rpt_model::{ModelError, Row, RowMut, Table, Value};

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to build row worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Worker pool configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapOptions {
    /// Worker count; defaults to the number of available CPUs.
    pub threads: Option<usize>,
}

/// A row mapper bound to its own fixed-size worker pool.
pub struct RowMapper {
    pool: ThreadPool,
    threads: usize,
}

impl std::fmt::Debug for RowMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowMapper")
            .field("threads", &self.threads)
            .finish_non_exhaustive()
    }
}

impl RowMapper {
    /// Builds a mapper with one worker per available CPU.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Pool`] if the worker threads cannot be spawned.
    pub fn new() -> Result<Self, MapError> {
        Self::with_options(MapOptions::default())
    }

    /// # Errors
    ///
    /// Returns [`MapError::Pool`] if the worker threads cannot be spawned.
    pub fn with_threads(threads: usize) -> Result<Self, MapError> {
        Self::with_options(MapOptions {
            threads: Some(threads),
        })
    }

    /// # Errors
    ///
    /// Returns [`MapError::Pool`] if the worker threads cannot be spawned.
    pub fn with_options(options: MapOptions) -> Result<Self, MapError> {
        let threads = options.threads.unwrap_or_else(num_cpus::get).max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|idx| format!("rpt-row-{idx}"))
            .build()?;
        Ok(Self { pool, threads })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Collect mode on this mapper's pool.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by a row function.
    pub fn map<T, E, F>(&self, table: &Table, f: F) -> Result<Vec<Option<T>>, E>
    where
        F: Fn(Row<'_>) -> Result<Option<T>, E> + Sync,
        T: Send,
        E: Send,
    {
        debug!(rows = table.height(), threads = self.threads, "collecting rows");
        self.pool.install(|| collect_rows(table, &f))
    }

    /// Mutate mode on this mapper's pool.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by a row function, or a model error if a
    /// staged write cannot be stored.
    pub fn apply<E, F>(&self, table: Table, f: F) -> Result<Table, E>
    where
        F: Fn(&mut RowMut<'_>) -> Result<(), E> + Sync,
        E: Send + From<ModelError>,
    {
        debug!(rows = table.height(), threads = self.threads, "applying rows");
        let writes = self.pool.install(|| stage_rows(&table, &f))?;
        commit(table, writes)
    }
}

/// Sizes the global pool used by [`map_rows`] and [`apply_rows`].
///
/// Must run before the first row function touches the global pool; returns
/// the worker count actually configured.
///
/// # Errors
///
/// Returns [`MapError::Pool`] if the global pool was already initialized.
pub fn init_global_pool(options: MapOptions) -> Result<usize, MapError> {
    let threads = options.threads.unwrap_or_else(num_cpus::get).max(1);
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|idx| format!("rpt-row-{idx}"))
        .build_global()?;
    debug!(threads, "configured global row pool");
    Ok(threads)
}

/// Collect mode on the global pool.
///
/// # Errors
///
/// Returns the first error produced by a row function.
pub fn map_rows<T, E, F>(table: &Table, f: F) -> Result<Vec<Option<T>>, E>
where
    F: Fn(Row<'_>) -> Result<Option<T>, E> + Sync,
    T: Send,
    E: Send,
{
    collect_rows(table, &f)
}

/// Mutate mode on the global pool.
///
/// # Errors
///
/// Returns the first error produced by a row function, or a model error if a
/// staged write cannot be stored.
pub fn apply_rows<E, F>(table: Table, f: F) -> Result<Table, E>
where
    F: Fn(&mut RowMut<'_>) -> Result<(), E> + Sync,
    E: Send + From<ModelError>,
{
    let writes = stage_rows(&table, &f)?;
    commit(table, writes)
}

fn collect_rows<T, E, F>(table: &Table, f: &F) -> Result<Vec<Option<T>>, E>
where
    F: Fn(Row<'_>) -> Result<Option<T>, E> + Sync,
    T: Send,
    E: Send,
{
    (0..table.height())
        .into_par_iter()
        .filter_map(|position| table.row(position))
        .map(f)
        .collect()
}

type StagedWrites = Vec<Vec<(usize, Value)>>;

fn stage_rows<E, F>(table: &Table, f: &F) -> Result<StagedWrites, E>
where
    F: Fn(&mut RowMut<'_>) -> Result<(), E> + Sync,
    E: Send,
{
    (0..table.height())
        .into_par_iter()
        .filter_map(|position| table.row(position))
        .map(|row| -> Result<Vec<(usize, Value)>, E> {
            let mut view = RowMut::new(row);
            f(&mut view)?;
            Ok(view.into_writes())
        })
        .collect()
}

fn commit<E: From<ModelError>>(mut table: Table, writes: StagedWrites) -> Result<Table, E> {
    let mut touched = 0usize;
    for (position, row_writes) in writes.into_iter().enumerate() {
        if !row_writes.is_empty() {
            touched += 1;
        }
        for (column, value) in row_writes {
            table.set_cell_at(position, column, value)?;
        }
    }
    debug!(rows = touched, "committed staged row writes");
    Ok(table)
}
