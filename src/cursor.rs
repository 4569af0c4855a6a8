use std::sync::Arc;

use log::debug;

use crate::{
    BufferSize, Error, NullableField, ParameterError, Query, ResultSet, StateError,
    driver::{Connection, RowCount},
    error::IntoStatementError,
};

/// Options used to configure a [`Cursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorOptions {
    /// Capacity of the buffers result set rows are fetched into.
    pub buffer_size: BufferSize,
    /// Number of parameter sets send to the driver with a single call.
    pub parameter_sets_to_buffer: usize,
    /// Fetch the next batch of a result set on a dedicated system thread, while the application
    /// consumes the current one. Doubles the memory required for result buffers.
    pub use_async_io: bool,
    /// Upper bound for the element size of text result buffers, in bytes. Applied to columns for
    /// which the driver reports no, or a larger, maximum length.
    pub max_text_size: usize,
}

impl Default for CursorOptions {
    fn default() -> Self {
        Self {
            buffer_size: BufferSize::default(),
            parameter_sets_to_buffer: 1000,
            use_async_io: false,
            max_text_size: 65535,
        }
    }
}

impl CursorOptions {
    fn validate(&self) -> Result<(), Error> {
        if !self.buffer_size.is_valid() {
            return Err(Error::InvalidOption {
                option: "buffer_size",
                reason: "must allow for at least one row",
            });
        }
        if self.parameter_sets_to_buffer == 0 {
            return Err(Error::InvalidOption {
                option: "parameter_sets_to_buffer",
                reason: "must be at least one",
            });
        }
        if self.max_text_size == 0 {
            return Err(Error::InvalidOption {
                option: "max_text_size",
                reason: "must be at least one byte",
            });
        }
        Ok(())
    }
}

/// Prepares and executes statements on a shared connection.
///
/// A cursor holds at most one prepared statement ([`Query`]) and the [`ResultSet`] of its last
/// execution. Preparing or executing again invalidates that result set.
pub struct Cursor<C: Connection> {
    connection: Arc<C>,
    options: CursorOptions,
    query: Option<Query<C::Statement>>,
    result_set: Option<ResultSet<C::Statement>>,
}

impl<C: Connection> Cursor<C> {
    /// A cursor without a prepared statement. Fails with [`Error::InvalidOption`] if `options`
    /// would not allow for any rows in a batch.
    pub fn new(connection: Arc<C>, options: CursorOptions) -> Result<Self, Error> {
        options.validate()?;
        Ok(Self {
            connection,
            options,
            query: None,
            result_set: None,
        })
    }

    /// Discards the current statement and result set, and prepares `sql` in their stead. Any
    /// fetch in flight for the discarded result set completes before the new statement is
    /// prepared.
    pub fn prepare(&mut self, sql: &str) -> Result<(), Error> {
        self.discard_result_set();
        self.query = None;
        debug!("Preparing statement: {sql}");
        let statement = self.connection.prepare(sql).statement_error("prepare")?;
        self.query = Some(Query::new(statement, &self.options)?);
        Ok(())
    }

    /// Adds a parameter set to be executed with the prepared statement. Complete batches are send
    /// to the driver immediately, which is why this may report errors of the driver, too.
    ///
    /// The result set of a previous execution is invalidated.
    pub fn add_parameter_set(&mut self, values: &[NullableField]) -> Result<(), Error> {
        self.discard_result_set();
        let query = self
            .query
            .as_mut()
            .ok_or(ParameterError::NoPreparedStatement)?;
        query.add_parameter_set(values)
    }

    /// Executes the prepared statement with all parameter sets not yet send to the driver. If it
    /// produces a result set, the first batch is fetched and the result set is available via
    /// [`Self::result_set`].
    ///
    /// Batches already executed are not rolled back, if executing a later one fails.
    pub fn execute(&mut self) -> Result<(), Error> {
        self.discard_result_set();
        let query = self.query.as_mut().ok_or(StateError::NoPreparedStatement)?;
        self.result_set = query.execute()?;
        Ok(())
    }

    /// Row count reported by the driver for the last execution. Negative values indicate the
    /// driver could not tell. Fails with [`StateError::NoRowCount`] if the last call to
    /// [`Self::execute`] did not execute the statement, because no parameter sets were added.
    pub fn row_count(&self) -> Result<RowCount, Error> {
        let row_count = self.query.as_ref().and_then(Query::row_count);
        Ok(row_count.ok_or(StateError::NoRowCount)?)
    }

    /// Result set of the last execution. `None` if the statement did not produce one.
    pub fn result_set(&self) -> Option<ResultSet<C::Statement>> {
        self.result_set.clone()
    }

    /// The prepared statement, or `None` if there is none.
    pub fn query(&self) -> Option<&Query<C::Statement>> {
        self.query.as_ref()
    }

    pub fn connection(&self) -> &Arc<C> {
        &self.connection
    }

    pub fn options(&self) -> &CursorOptions {
        &self.options
    }

    /// `true` if a statement has been prepared successfully.
    pub fn is_prepared(&self) -> bool {
        self.query.is_some()
    }

    /// Releases the result set, the statement and all buffers. The connection stays open.
    pub fn close(self) {}

    /// Invalidates the current result set and hands its statement back to the query.
    fn discard_result_set(&mut self) {
        let Some(result_set) = self.result_set.take() else {
            return;
        };
        if let (Some(statement), Some(query)) = (result_set.invalidate(), self.query.as_mut()) {
            query.restore_statement(statement);
        }
    }
}

impl<C: Connection> Drop for Cursor<C> {
    fn drop(&mut self) {
        // Drain the fetch thread before releasing the statement.
        self.discard_result_set();
        self.query = None;
    }
}

#[cfg(test)]
mod tests {
    use crate::{BufferSize, Error};

    use super::CursorOptions;

    #[test]
    fn default_options_are_valid() {
        assert!(CursorOptions::default().validate().is_ok());
    }

    #[test]
    fn zero_sized_buffers_are_rejected() {
        let options = CursorOptions {
            buffer_size: BufferSize::Rows(0),
            ..CursorOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(Error::InvalidOption {
                option: "buffer_size",
                ..
            })
        ));

        let options = CursorOptions {
            parameter_sets_to_buffer: 0,
            ..CursorOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(Error::InvalidOption {
                option: "parameter_sets_to_buffer",
                ..
            })
        ));
    }
}
