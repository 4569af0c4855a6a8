//! Interface of the row oriented database driver this crate builds upon.
//!
//! Two decisions are already baked into this module:
//!
//! * Driver failures are reported as a diagnostic [`Record`], which is passed on to the
//!   application unchanged.
//! * Warnings are treated by logging them with `log`.

mod diagnostics;
mod logging;

pub use self::{
    diagnostics::{Diagnostics, Record, State},
    logging::log_diagnostics,
};

use crate::{ColumnInfo, buffers::ColumnarBuffer};

/// Number of rows affected by the last execution, as reported by the driver. Negative values are
/// the drivers way of saying it does not know (e.g. `-1` for `SELECT` statements, before all rows
/// are fetched). They are passed on as is.
pub type RowCount = i64;

/// A connection to a data source. Cursors share the connection with each other and with the
/// application. They never close it.
pub trait Connection {
    /// Prepared statement handle created by this connection.
    type Statement: Statement + 'static;

    /// Prepares `sql` for (repeated) execution. The driver is expected to reject invalid SQL, lack
    /// of permissions or broken connectivity with an error record.
    fn prepare(&self, sql: &str) -> Result<Self::Statement, Record>;
}

/// A prepared statement. Each method corresponds to one (bulk) call into the driver.
///
/// Statements must be [`Send`], since fetching may be moved to a dedicated system thread, if
/// asynchronous I/O is enabled. Calls into one statement never happen concurrently though.
pub trait Statement: Send + Diagnostics {
    /// Number of parameter placeholders (`?`) in the statement text.
    fn num_params(&mut self) -> Result<usize, Record>;

    /// Binds the valid rows of `parameters` to the parameter positions of the statement. Column
    /// `n` of the buffer is bound to the parameter placeholder `n + 1`. Each row of the buffer is
    /// one parameter set. Only the first [`ColumnarBuffer::num_rows`] rows must be used.
    fn bind_parameter_batch(&mut self, parameters: &ColumnarBuffer) -> Result<(), Record>;

    /// Executes the statement with the parameters bound last (if any). Executing a batch of
    /// parameter sets is one call.
    fn execute(&mut self) -> Result<RowCount, Record>;

    /// Describes the columns of the result set produced by the last execution. An empty `Vec`
    /// indicates that the statement did not produce a result set.
    fn describe_result_columns(&mut self) -> Result<Vec<ColumnInfo>, Record>;

    /// Fetches the next batch of rows into `buffer`. The driver must write at most
    /// [`ColumnarBuffer::capacity`] rows, starting with the first one.
    ///
    /// # Return
    ///
    /// Number of rows written. `0` if the result set is consumed completely.
    fn fetch(&mut self, buffer: &mut ColumnarBuffer) -> Result<usize, Record>;
}
