mod concurrent;

use std::ops::Range;

use log::{debug, trace, warn};

use crate::{
    Error, NullableField,
    buffers::ColumnarBuffer,
    driver::{Record, Statement, log_diagnostics},
};

pub use self::concurrent::ConcurrentFetch;

/// Fetches the next batch from `statement` into `buffer`.
///
/// # Return
///
/// `true` if at least one row has been fetched, `false` if the result set is consumed.
pub(crate) fn fetch_batch<S>(statement: &mut S, buffer: &mut ColumnarBuffer) -> Result<bool, Record>
where
    S: Statement + ?Sized,
{
    let num_rows = statement.fetch(buffer)?;
    log_diagnostics(statement);
    if num_rows > buffer.capacity() {
        warn!(
            "Driver reported {num_rows} fetched rows, but the buffer only holds {}.",
            buffer.capacity()
        );
    }
    let num_rows = num_rows.min(buffer.capacity());
    buffer.set_num_rows(num_rows);
    trace!("Fetched batch with {num_rows} rows.");
    Ok(num_rows != 0)
}

/// State of a [`ResultBatchFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    /// Nothing fetched yet.
    Empty,
    /// The current batch has been filled by the driver. Rows may or may not be consumed already.
    Ready,
    /// The last fetch did not return any rows. Terminal.
    Exhausted,
    /// The driver reported an error fetching the last batch. Terminal.
    Failed(Record),
}

/// Where the next batch comes from.
enum Source<S> {
    /// Fetches are issued on the application thread, directly into the current batch.
    Blocking(S),
    /// Fetches run one batch ahead on a dedicated system thread.
    Concurrent(ConcurrentFetch<S>),
}

/// Keeps track of the rows consumed from the current batch and refills it from the driver, once
/// all of them are consumed.
pub struct ResultBatchFetcher<S> {
    batch: ColumnarBuffer,
    /// Number of rows already consumed from `batch`.
    offset: usize,
    state: FetchState,
    source: Source<S>,
}

impl<S> ResultBatchFetcher<S>
where
    S: Statement + 'static,
{
    /// Fetches the first batch into `batch`. If `prefetch_buffer` is specified, fetching continues
    /// one batch ahead on a dedicated thread using it as the second buffer. It must have the same
    /// layout as `batch`.
    ///
    /// A failing first fetch is not reported here, but on the first attempt to access a row.
    pub fn new(
        statement: S,
        batch: ColumnarBuffer,
        prefetch_buffer: Option<ColumnarBuffer>,
    ) -> Self {
        let mut fetcher = Self {
            batch,
            offset: 0,
            state: FetchState::Empty,
            source: Source::Blocking(statement),
        };
        fetcher.refill();
        match prefetch_buffer {
            // Nothing left to fetch ahead, if the first batch is already the end.
            Some(prefetch_buffer) if fetcher.state == FetchState::Ready => {
                fetcher.into_concurrent(prefetch_buffer)
            }
            _ => fetcher,
        }
    }

    /// Moves the statement to a fetch thread, which starts filling `prefetch_buffer` right away.
    fn into_concurrent(self, prefetch_buffer: ColumnarBuffer) -> Self {
        let Self {
            batch,
            offset,
            state,
            source,
        } = self;
        let source = match source {
            Source::Blocking(statement) => {
                debug!("Fetching next batch concurrently.");
                Source::Concurrent(ConcurrentFetch::start(statement, prefetch_buffer))
            }
            concurrent @ Source::Concurrent(_) => concurrent,
        };
        Self {
            batch,
            offset,
            state,
            source,
        }
    }

    /// Fills the current batch with the next one, and updates the state accordingly.
    fn refill(&mut self) {
        self.offset = 0;
        let result = match &mut self.source {
            Source::Blocking(statement) => fetch_batch(statement, &mut self.batch),
            Source::Concurrent(concurrent) => concurrent.fetch_into(&mut self.batch),
        };
        self.state = match result {
            Ok(true) => FetchState::Ready,
            Ok(false) => {
                self.batch.set_num_rows(0);
                FetchState::Exhausted
            }
            Err(record) => {
                self.batch.set_num_rows(0);
                FetchState::Failed(record)
            }
        };
    }

    /// `false` only if all rows of the result set have been consumed. Fetches the next batch, if
    /// the current one is consumed.
    pub fn has_next_row(&mut self) -> Result<bool, Error> {
        loop {
            if self.offset < self.batch.num_rows() {
                return Ok(true);
            }
            match &self.state {
                FetchState::Exhausted => return Ok(false),
                FetchState::Failed(record) => return Err(Error::Fetch(record.clone())),
                FetchState::Empty | FetchState::Ready => self.refill(),
            }
        }
    }

    /// Materializes the next row and advances. `None` if the result set is consumed.
    pub fn next_row(&mut self) -> Result<Option<Vec<NullableField>>, Error> {
        if !self.has_next_row()? {
            return Ok(None);
        }
        let row = self.batch.row(self.offset);
        self.offset += 1;
        Ok(Some(row))
    }

    /// Yields the rows of the current batch, not yet consumed and marks them as consumed. `None` if
    /// the result set is consumed.
    pub fn next_rows(&mut self) -> Result<Option<(&ColumnarBuffer, Range<usize>)>, Error> {
        if !self.has_next_row()? {
            return Ok(None);
        }
        let rows = self.offset..self.batch.num_rows();
        self.offset = rows.end;
        Ok(Some((&self.batch, rows)))
    }
}

impl<S> ResultBatchFetcher<S> {
    pub fn state(&self) -> &FetchState {
        &self.state
    }

    /// Capacity of the buffer fetched into. Maximum number of rows in a batch.
    pub fn batch_size(&self) -> usize {
        self.batch.capacity()
    }

    /// Drains any fetch in flight and yields the statement back.
    pub fn into_statement(self) -> Option<S> {
        match self.source {
            Source::Blocking(statement) => Some(statement),
            Source::Concurrent(concurrent) => concurrent.into_statement(),
        }
    }
}
