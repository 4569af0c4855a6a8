use std::fmt;

/// Number of characters of an SQLSTATE code.
const SQLSTATE_SIZE: usize = 5;

/// A five character SQLSTATE code. The first two characters indicate the class; the next three
/// indicate the subclass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct State(pub [u8; SQLSTATE_SIZE]);

impl State {
    /// General warning.
    pub const GENERAL_WARNING: State = State(*b"01000");
    /// String or binary data returned for a column resulted in the truncation of nonblank character
    /// or non-NULL binary data. If it was a string value, it was right-truncated.
    pub const STRING_DATA_RIGHT_TRUNCATION: State = State(*b"01004");
    /// Syntax error or access violation.
    pub const SYNTAX_ERROR_OR_ACCESS_VIOLATION: State = State(*b"42000");
    /// Communication link failure.
    pub const COMMUNICATION_LINK_FAILURE: State = State(*b"08S01");
    /// Function sequence error.
    pub const FUNCTION_SEQUENCE_ERROR: State = State(*b"HY010");

    /// View status code as string slice for displaying. SQLSTATE codes consist of ASCII characters,
    /// anything else is replaced.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("?????")
    }
}

/// Diagnostic record emitted by the driver. Attached to every error, which originates in the
/// driver and also used to report warnings.
///
/// Use `std::fmt::Display` to retrieve status code and other information.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub state: State,
    /// Error code returned by the driver
    pub native_error: i32,
    /// Human readable description, as emitted by the driver.
    pub message: String,
}

impl Record {
    pub fn new(state: State, native_error: i32, message: impl Into<String>) -> Self {
        Self {
            state,
            native_error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "State: {}, Native error: {}, Message: {}",
            self.state.as_str(),
            self.native_error,
            self.message,
        )
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Report diagnostics from the last call into the driver. Used to retrieve warnings, which
/// accompany successful calls.
pub trait Diagnostics {
    /// Call this method to retrieve diagnostic information for the last call into the driver.
    ///
    /// # Arguments
    ///
    /// * `rec_number` - Indicates the status record from which the application seeks information.
    ///   Status records are numbered from 1.
    ///
    /// # Result
    ///
    /// * `Some(rec)` - The diagnostic record with the index `rec_number`.
    /// * `None` - `rec_number` was greater than the number of diagnostic records that existed. The
    ///   default implementation never has any diagnostics to report.
    fn diagnostic_record(&self, _rec_number: i16) -> Option<Record> {
        None
    }
}

#[cfg(test)]
mod tests {

    use super::{Record, State};

    #[test]
    fn formatting() {
        // build diagnostic record
        let rec = Record::new(
            State(*b"HY010"),
            0,
            "[Microsoft][ODBC Driver Manager] Function sequence error",
        );

        // test formatting
        assert_eq!(
            format!("{rec}"),
            "State: HY010, Native error: 0, Message: [Microsoft][ODBC Driver Manager] \
             Function sequence error"
        );
    }

    #[test]
    fn state_with_non_ascii_characters_is_displayed_as_placeholder() {
        let state = State([0xff, b'0', b'0', b'0', b'0']);

        assert_eq!("?????", state.as_str());
    }
}
