use log::debug;

use crate::{
    BufferSize, CursorOptions, Error, NullableField, ParameterBatchAccumulator, ParameterError,
    ResultSet, StateError,
    buffers::{BufferDesc, ColumnarBuffer},
    driver::{RowCount, Statement, log_diagnostics},
    error::IntoStatementError,
    fetch::ResultBatchFetcher,
};

/// A prepared statement together with the buffers used to send parameter sets to it in bulk.
///
/// The statement is lend to the [`ResultSet`] produced by [`Self::execute`], and must be given
/// back with [`Self::restore_statement`], before parameters can be send or the statement can be
/// executed again.
pub struct Query<S> {
    /// `None` while the statement is owned by a result set.
    statement: Option<S>,
    num_params: usize,
    parameters: ParameterBatchAccumulator,
    buffer_size: BufferSize,
    use_async_io: bool,
    max_text_size: usize,
    /// Accumulated row count of the batches already send since the last execution.
    pending_row_count: Option<RowCount>,
    /// Row count of the last successful execution.
    row_count: Option<RowCount>,
}

impl<S> Query<S>
where
    S: Statement + 'static,
{
    /// Wraps a freshly prepared statement. Allocates the parameter buffers.
    pub fn new(mut statement: S, options: &CursorOptions) -> Result<Self, Error> {
        let num_params = statement.num_params().statement_error("num_params")?;
        log_diagnostics(&statement);
        Ok(Self {
            statement: Some(statement),
            num_params,
            parameters: ParameterBatchAccumulator::new(
                num_params,
                options.parameter_sets_to_buffer,
            ),
            buffer_size: options.buffer_size,
            use_async_io: options.use_async_io,
            max_text_size: options.max_text_size,
            pending_row_count: None,
            row_count: None,
        })
    }

    /// Number of parameter placeholders in the statement.
    pub fn num_params(&self) -> usize {
        self.num_params
    }

    /// Stages `values` as the next parameter set. A batch is send to the driver, as soon as it is
    /// complete. Errors of the driver executing it are reported by this call.
    ///
    /// Statements without parameters are executed exactly once by [`Self::execute`], so empty
    /// parameter sets are not staged for them.
    pub fn add_parameter_set(&mut self, values: &[NullableField]) -> Result<(), Error> {
        if values.len() != self.num_params {
            return Err(ParameterError::CountMismatch {
                expected: self.num_params,
                actual: values.len(),
            }
            .into());
        }
        if self.num_params == 0 {
            debug!("Ignoring empty parameter set of a statement without parameters.");
            return Ok(());
        }
        self.parameters.add(values);
        if self.parameters.is_full() {
            self.send_parameters()?;
        }
        Ok(())
    }

    /// Binds the staged parameter sets and executes the statement with them. The staged rows are
    /// discarded, even if the driver reports an error.
    fn send_parameters(&mut self) -> Result<(), Error> {
        let statement = self.statement.as_mut().ok_or(StateError::StatementInUse)?;
        debug!(
            "Executing statement with a batch of {} parameter sets.",
            self.parameters.num_rows()
        );
        let result = bind_and_execute(statement, self.parameters.batch());
        self.parameters.clear();
        let row_count = result?;
        self.pending_row_count = Some(add_row_counts(self.pending_row_count, row_count));
        Ok(())
    }

    /// Sends the remaining parameter sets, or executes the statement once if it has no
    /// parameters. If the statement produces a result set, its first batch is fetched.
    ///
    /// A statement with parameters, but no parameter sets added since the last execution, is not
    /// executed at all. Since the driver reports no row count in this case, there is none
    /// afterwards.
    pub fn execute(&mut self) -> Result<Option<ResultSet<S>>, Error> {
        self.row_count = None;
        let flushed = if self.parameters.is_empty() {
            Ok(())
        } else {
            self.send_parameters()
        };
        let pending_row_count = self.pending_row_count.take();
        flushed?;

        let statement = self.statement.as_mut().ok_or(StateError::StatementInUse)?;
        let row_count = if self.num_params == 0 {
            debug!("Executing statement without parameters.");
            let row_count = statement.execute().statement_error("execute")?;
            log_diagnostics(statement);
            row_count
        } else if let Some(row_count) = pending_row_count {
            row_count
        } else {
            debug!("No parameter sets have been added. Statement is not executed.");
            return Ok(None);
        };
        self.row_count = Some(row_count);

        let columns = statement
            .describe_result_columns()
            .statement_error("describe_result_columns")?;
        log_diagnostics(statement);
        if columns.is_empty() {
            return Ok(None);
        }

        let descs: Vec<BufferDesc> = columns
            .iter()
            .map(|column| BufferDesc::from_data_type(column.data_type, self.max_text_size))
            .collect();
        let bytes_per_row = descs.iter().map(|desc| desc.bytes_per_row()).sum();
        let batch_size = self.buffer_size.rows_for(bytes_per_row);
        debug!(
            "Allocating result buffers for {} columns and {batch_size} rows. Bytes per row: \
            {bytes_per_row}.",
            descs.len()
        );
        let batch = ColumnarBuffer::try_from_descs(batch_size, descs.iter().copied())?;
        let prefetch_buffer = if self.use_async_io {
            Some(ColumnarBuffer::try_from_descs(batch_size, descs)?)
        } else {
            None
        };

        let Some(statement) = self.statement.take() else {
            return Err(StateError::StatementInUse.into());
        };
        let fetcher = ResultBatchFetcher::new(statement, batch, prefetch_buffer);
        Ok(Some(ResultSet::new(fetcher, columns)))
    }
}

impl<S> Query<S> {
    /// Gives back the statement, after the result set borrowing it has been invalidated.
    pub fn restore_statement(&mut self, statement: S) {
        self.statement = Some(statement);
    }

    /// `true` unless the statement is owned by a result set.
    pub fn has_statement(&self) -> bool {
        self.statement.is_some()
    }

    /// Row count reported by the driver for the last successful execution. `None` if the last
    /// call to [`Self::execute`] did not execute the statement.
    pub fn row_count(&self) -> Option<RowCount> {
        self.row_count
    }

    /// Number of parameter sets staged, but not yet send to the driver.
    pub fn num_staged_parameter_sets(&self) -> usize {
        self.parameters.num_rows()
    }
}

fn bind_and_execute<S>(statement: &mut S, parameters: &ColumnarBuffer) -> Result<RowCount, Error>
where
    S: Statement + ?Sized,
{
    statement
        .bind_parameter_batch(parameters)
        .statement_error("bind_parameter_batch")?;
    log_diagnostics(statement);
    let row_count = statement.execute().statement_error("execute")?;
    log_diagnostics(statement);
    Ok(row_count)
}

/// Sums up the row counts of individual batches. The first negative count is the drivers way of
/// telling us it does not know. It is passed on unchanged.
fn add_row_counts(total: Option<RowCount>, batch: RowCount) -> RowCount {
    match total {
        None => batch,
        Some(total) if total < 0 => total,
        Some(_) if batch < 0 => batch,
        Some(total) => total + batch,
    }
}
