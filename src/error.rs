use thiserror::Error as ThisError;

use crate::driver::Record as DiagnosticRecord;

/// Error indicating a failed allocation for a column buffer
#[derive(Debug)]
pub struct TooLargeBufferSize {
    /// Number of elements supposed to be in the buffer.
    pub num_elements: usize,
    /// Element size in the buffer in bytes.
    pub element_size: usize,
}

impl TooLargeBufferSize {
    /// Map the column allocation error to an [`crate::Error`] adding the context of which
    /// column caused the allocation error.
    pub fn add_context(self, buffer_index: usize) -> Error {
        Error::TooLargeColumnBufferSize {
            buffer_index,
            num_elements: self.num_elements,
            element_size: self.element_size,
        }
    }
}

/// The application misused the parameter interface.
#[derive(Debug, ThisError, Clone, Copy, PartialEq, Eq)]
pub enum ParameterError {
    #[error("Parameter sets can only be added after a statement has been prepared.")]
    NoPreparedStatement,
    #[error(
        "Number of values in the parameter set ({actual}) does not match the number of parameters \
        of the prepared statement ({expected})."
    )]
    CountMismatch { expected: usize, actual: usize },
}

/// An operation has been invoked out of order.
#[derive(Debug, ThisError, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    #[error("There is no row count, since no statement has been executed successfully yet.")]
    NoRowCount,
    #[error("A statement must be prepared before it can be executed.")]
    NoPreparedStatement,
    #[error(
        "The result set is no longer valid. It has been discarded by preparing or executing \
        another statement, or by closing its cursor."
    )]
    ResultSetInvalidated,
    #[error(
        "The statement is still owned by its result set. The result set needs to be discarded \
        before the statement can be executed again."
    )]
    StatementInUse,
}

#[derive(Debug, ThisError)]
/// Error type of this crate. Errors emitted by the driver carry the diagnostic record of the
/// driver unchanged.
pub enum Error {
    /// The driver rejected preparing or executing a statement (e.g. due to a syntax error, missing
    /// permissions or lost connectivity).
    #[error("The driver emitted an error calling '{function}':\n{record}")]
    Statement {
        /// Diagnostic record returned by the driver
        record: DiagnosticRecord,
        /// Driver call which produced the diagnostic record
        function: &'static str,
    },
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    /// Fetching a batch of rows from the driver failed. The result set is in a terminal state and
    /// must be recreated by executing the statement again.
    #[error("The driver emitted an error fetching rows:\n{0}")]
    Fetch(DiagnosticRecord),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(
        "There is not enough memory to allocate enough memory for a column buffer. Number of \
        elements requested for the column buffer: {num_elements}; Size needed to hold the largest \
        possible element: {element_size}."
    )]
    TooLargeColumnBufferSize {
        /// Zero based column buffer index.
        buffer_index: usize,
        num_elements: usize,
        element_size: usize,
    },
    #[error("Invalid option '{option}': {reason}")]
    InvalidOption {
        option: &'static str,
        reason: &'static str,
    },
}

/// Convinience for attaching the name of the failed driver call to a driver error.
pub(crate) trait IntoStatementError<T> {
    fn statement_error(self, function: &'static str) -> Result<T, Error>;
}

impl<T> IntoStatementError<T> for Result<T, DiagnosticRecord> {
    fn statement_error(self, function: &'static str) -> Result<T, Error> {
        self.map_err(|record| Error::Statement { record, function })
    }
}

#[cfg(test)]
mod tests {
    use crate::driver::{Record, State};

    use super::{Error, IntoStatementError, ParameterError};

    #[test]
    fn statement_error_contains_driver_message() {
        let result: Result<(), Record> = Err(Record::new(
            State::SYNTAX_ERROR_OR_ACCESS_VIOLATION,
            102,
            "Incorrect syntax near 'FORM'.",
        ));

        let error = result.statement_error("prepare").unwrap_err();

        assert_eq!(
            "The driver emitted an error calling 'prepare':\nState: 42000, Native error: 102, \
            Message: Incorrect syntax near 'FORM'.",
            error.to_string()
        );
    }

    #[test]
    fn parameter_errors_are_displayed_transparently() {
        let error: Error = ParameterError::CountMismatch {
            expected: 2,
            actual: 3,
        }
        .into();

        assert_eq!(
            "Number of values in the parameter set (3) does not match the number of parameters of \
            the prepared statement (2).",
            error.to_string()
        );
    }
}
