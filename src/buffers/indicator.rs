/// Indicator value marking a `NULL` value.
pub const NULL_DATA: isize = -1;
/// Indicator value used by drivers, which could not determine the complete length of a value.
pub const NO_TOTAL: isize = -4;

/// Indicates existence and length of a value.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Indicator {
    /// Field does not exist
    Null,
    /// Field exists, but its length had not be reported by the driver.
    NoTotal,
    /// Fields exists. Value indicates number of bytes required to store the value. In case of
    /// truncated data, this is the true length of the data, before truncation occurred.
    Length(usize),
}

impl Indicator {
    /// Creates an indicator from an `isize` indicator value. Negative values other than
    /// [`NULL_DATA`] do not carry a length and are treated like [`NO_TOTAL`].
    pub fn from_isize(indicator: isize) -> Self {
        match indicator {
            NULL_DATA => Indicator::Null,
            other => usize::try_from(other)
                .map(Indicator::Length)
                .unwrap_or(Indicator::NoTotal),
        }
    }

    /// Creates the `isize` representation stored in indicator buffers.
    pub fn to_isize(self) -> isize {
        match self {
            Indicator::Null => NULL_DATA,
            Indicator::NoTotal => NO_TOTAL,
            Indicator::Length(len) => isize::try_from(len).unwrap_or(isize::MAX),
        }
    }

    /// Does this indicator imply truncation for a value of the given length?
    ///
    /// `length_in_buffer` is specified in bytes.
    pub fn is_truncated(self, length_in_buffer: usize) -> bool {
        match self {
            Indicator::Null => false,
            Indicator::NoTotal => true,
            Indicator::Length(complete_length) => complete_length > length_in_buffer,
        }
    }

    pub fn is_null(self) -> bool {
        matches!(self, Indicator::Null)
    }

    /// If the indicator is [`Indicator::Length`] this is [`Some`].
    pub fn length(self) -> Option<usize> {
        if let Indicator::Length(len) = self {
            Some(len)
        } else {
            None
        }
    }
}
