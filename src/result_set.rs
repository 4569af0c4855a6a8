use std::{
    ops::Range,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use log::debug;

use crate::{
    ColumnInfo, Error, NullableField, StateError,
    buffers::ColumnarBuffer,
    driver::Statement,
    fetch::{FetchState, ResultBatchFetcher},
};

/// Rows produced by a single execution of a statement.
///
/// Rows are fetched from the driver in batches, but handed out one by one with
/// [`Self::fetch_row`], or the remainder of the current batch at once with
/// [`Self::fetch_next_batch`]. Batching does not influence which rows are observed, or in which
/// order.
///
/// A `ResultSet` is a handle. Clones refer to the same rows. It stays valid until its cursor
/// prepares or executes another statement, or is dropped. Accessing it afterwards fails with
/// [`StateError::ResultSetInvalidated`].
pub struct ResultSet<S> {
    fetcher: Arc<Mutex<Option<ResultBatchFetcher<S>>>>,
    columns: Arc<[ColumnInfo]>,
}

impl<S> ResultSet<S> {
    pub(crate) fn new(fetcher: ResultBatchFetcher<S>, columns: Vec<ColumnInfo>) -> Self {
        Self {
            fetcher: Arc::new(Mutex::new(Some(fetcher))),
            columns: columns.into(),
        }
    }

    /// Name, type and nullability of each column, as described by the driver after execution.
    pub fn column_info(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn num_cols(&self) -> usize {
        self.columns.len()
    }

    /// `false` once the result set has been invalidated.
    pub fn is_valid(&self) -> bool {
        self.lock().is_some()
    }

    /// Maximum number of rows fetched with one call to the driver.
    pub fn batch_size(&self) -> Result<usize, Error> {
        self.with_fetcher(|fetcher| Ok(fetcher.batch_size()))
    }

    /// State of the batch rows are currently read from. [`FetchState::Failed`] carries the error
    /// reported by the driver.
    pub fn fetch_state(&self) -> Result<FetchState, Error> {
        self.with_fetcher(|fetcher| Ok(fetcher.state().clone()))
    }

    /// Drains any fetch in flight and takes the statement away from this result set. Any further
    /// access to it, or any of its clones, fails.
    pub(crate) fn invalidate(&self) -> Option<S> {
        let fetcher = self.lock().take()?;
        debug!("Invalidating result set.");
        fetcher.into_statement()
    }

    fn lock(&self) -> MutexGuard<'_, Option<ResultBatchFetcher<S>>> {
        // Fetcher methods do not panic halfway through a state change.
        self.fetcher.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_fetcher<T>(
        &self,
        f: impl FnOnce(&mut ResultBatchFetcher<S>) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut guard = self.lock();
        let fetcher = guard.as_mut().ok_or(StateError::ResultSetInvalidated)?;
        f(fetcher)
    }
}

impl<S> ResultSet<S>
where
    S: Statement + 'static,
{
    /// `true` unless all rows have been consumed. May fetch the next batch from the driver, and
    /// report its failure.
    pub fn has_next_row(&self) -> Result<bool, Error> {
        self.with_fetcher(|fetcher| fetcher.has_next_row())
    }

    /// The next row, or `None` if all rows have been consumed.
    pub fn fetch_row(&self) -> Result<Option<Vec<NullableField>>, Error> {
        self.with_fetcher(|fetcher| fetcher.next_row())
    }

    /// All rows of the current batch not yet consumed, column by column. Fetches the next batch
    /// first, if the current one is consumed. `None` if all rows have been consumed.
    pub fn fetch_next_batch(&self) -> Result<Option<Vec<Vec<NullableField>>>, Error> {
        self.with_next_batch(|batch, rows| {
            (0..batch.num_cols())
                .map(|buffer_index| batch.column_values(buffer_index, rows.clone()))
                .collect()
        })
    }

    /// Grants access to the column buffers of the current batch, together with the range of rows
    /// not yet consumed. These rows are considered consumed afterwards. Use this to read values
    /// without materializing them as [`NullableField`]s.
    pub fn with_next_batch<T>(
        &self,
        f: impl FnOnce(&ColumnarBuffer, Range<usize>) -> T,
    ) -> Result<Option<T>, Error> {
        self.with_fetcher(|fetcher| {
            Ok(fetcher.next_rows()?.map(|(batch, rows)| f(batch, rows)))
        })
    }

    /// Iterates over the remaining rows. Iteration stops after the first error.
    pub fn rows(&self) -> Rows<S> {
        Rows {
            result_set: self.clone(),
            done: false,
        }
    }
}

impl<S> Clone for ResultSet<S> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            columns: self.columns.clone(),
        }
    }
}

/// Iterator over the remaining rows of a [`ResultSet`]. See [`ResultSet::rows`].
pub struct Rows<S> {
    result_set: ResultSet<S>,
    done: bool,
}

impl<S> Iterator for Rows<S>
where
    S: Statement + 'static,
{
    type Item = Result<Vec<NullableField>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.result_set.fetch_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}

impl<S> std::iter::FusedIterator for Rows<S> where S: Statement + 'static {}
