use std::mem::size_of;

use crate::{DataType, Date, Timestamp};

/// Describes the layout of a single column buffer.
///
/// While related to to the [`crate::DataType`] of the column this is bound to, the buffer
/// description is different as it does not describe the type of the data source but the format
/// the data is going to be represented in memory. Every buffer is able to represent `NULL`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferDesc {
    /// Signed 64 Bit integer
    I64,
    /// 64 bit floating point
    F64,
    /// Can either be zero or one
    Bit,
    /// Describes a buffer holding [`crate::Date`] values.
    Date,
    /// Describes a buffer holding [`crate::Timestamp`] values.
    Timestamp,
    /// Text buffer holding UTF-8 strings with a binary length of up to `max_str_len`.
    Text { max_str_len: usize },
    /// Binary buffer holding values of up to `length` bytes.
    Binary { length: usize },
}

impl BufferDesc {
    /// Describe a buffer which fits best the SQL Data Type reported by the driver.
    ///
    /// `max_text_size` is an upper bound for the element size of text and binary buffers. It is
    /// also used for columns which do not report any length (e.g. `VARCHAR(MAX)`).
    pub fn from_data_type(data_type: DataType, max_text_size: usize) -> Self {
        let bounded = |length: usize| {
            if length == 0 {
                max_text_size
            } else {
                length.min(max_text_size)
            }
        };
        match data_type {
            DataType::Numeric { precision, scale } | DataType::Decimal { precision, scale }
                if scale == 0 && precision < 19 =>
            {
                BufferDesc::I64
            }
            DataType::TinyInt | DataType::SmallInt | DataType::Integer | DataType::BigInt => {
                BufferDesc::I64
            }
            DataType::Real | DataType::Float | DataType::Double => BufferDesc::F64,
            DataType::Bit => BufferDesc::Bit,
            DataType::Date => BufferDesc::Date,
            DataType::Timestamp { .. } => BufferDesc::Timestamp,
            // A single UTF-16 code unit takes up to three bytes in UTF-8
            DataType::WVarchar { length } => BufferDesc::Text {
                max_str_len: bounded(length.saturating_mul(3)),
            },
            DataType::Binary { length } | DataType::Varbinary { length } => BufferDesc::Binary {
                length: bounded(length),
            },
            DataType::Other { column_size, .. } => BufferDesc::Text {
                max_str_len: bounded(column_size),
            },
            // Specialized buffers for fractional numeric, decimal and time values are not
            // supported. We fetch them as text.
            other => BufferDesc::Text {
                max_str_len: bounded(other.display_size().unwrap_or(0)),
            },
        }
    }

    /// Size of a single row in bytes, including its indicator.
    pub fn bytes_per_row(self) -> usize {
        let value_size = match self {
            BufferDesc::I64 => size_of::<i64>(),
            BufferDesc::F64 => size_of::<f64>(),
            BufferDesc::Bit => size_of::<bool>(),
            BufferDesc::Date => size_of::<Date>(),
            BufferDesc::Timestamp => size_of::<Timestamp>(),
            BufferDesc::Text { max_str_len } => max_str_len,
            BufferDesc::Binary { length } => length,
        };
        value_size + size_of::<isize>()
    }

    /// `true` if both buffers hold values of the same type, regardless of their element size.
    pub fn is_same_kind(self, other: BufferDesc) -> bool {
        matches!(
            (self, other),
            (BufferDesc::I64, BufferDesc::I64)
                | (BufferDesc::F64, BufferDesc::F64)
                | (BufferDesc::Bit, BufferDesc::Bit)
                | (BufferDesc::Date, BufferDesc::Date)
                | (BufferDesc::Timestamp, BufferDesc::Timestamp)
                | (BufferDesc::Text { .. }, BufferDesc::Text { .. })
                | (BufferDesc::Binary { .. }, BufferDesc::Binary { .. })
        )
    }

    /// Kind of a buffer able to hold values of both `self` and `other`. Integers widen to
    /// floats, anything mixed with binary to binary and any other mix to text. Element sizes of
    /// text and binary buffers returned for mixed kinds are zero.
    pub fn widen(self, other: BufferDesc) -> BufferDesc {
        match (self, other) {
            (desc, other) if desc.is_same_kind(other) => desc,
            (BufferDesc::I64, BufferDesc::F64) | (BufferDesc::F64, BufferDesc::I64) => {
                BufferDesc::F64
            }
            (BufferDesc::Binary { .. }, _) | (_, BufferDesc::Binary { .. }) => {
                BufferDesc::Binary { length: 0 }
            }
            _ => BufferDesc::Text { max_str_len: 0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::DataType;

    use super::BufferDesc;

    #[test]
    fn integral_decimals_are_fetched_as_integers() {
        let desc = BufferDesc::from_data_type(
            DataType::Decimal {
                precision: 10,
                scale: 0,
            },
            65535,
        );
        assert_eq!(BufferDesc::I64, desc);
    }

    #[test]
    fn fractional_decimals_are_fetched_as_text() {
        let desc = BufferDesc::from_data_type(
            DataType::Numeric {
                precision: 5,
                scale: 2,
            },
            65535,
        );
        assert_eq!(BufferDesc::Text { max_str_len: 7 }, desc);
    }

    #[test]
    fn unbounded_varchar_is_limited_by_max_text_size() {
        let desc = BufferDesc::from_data_type(DataType::Varchar { length: 0 }, 4000);
        assert_eq!(BufferDesc::Text { max_str_len: 4000 }, desc);

        let desc = BufferDesc::from_data_type(DataType::Varchar { length: 100_000 }, 4000);
        assert_eq!(BufferDesc::Text { max_str_len: 4000 }, desc);
    }

    #[test]
    fn kind_ignores_element_size() {
        let short = BufferDesc::Text { max_str_len: 1 };
        let long = BufferDesc::Text { max_str_len: 100 };
        assert!(short.is_same_kind(long));
        assert!(!short.is_same_kind(BufferDesc::Binary { length: 1 }));
    }

    #[test]
    fn mixed_kinds_widen_to_common_kind() {
        assert_eq!(BufferDesc::F64, BufferDesc::I64.widen(BufferDesc::F64));
        assert_eq!(BufferDesc::F64, BufferDesc::F64.widen(BufferDesc::I64));
        assert_eq!(
            BufferDesc::Text { max_str_len: 0 },
            BufferDesc::Date.widen(BufferDesc::I64)
        );
        assert_eq!(
            BufferDesc::Binary { length: 0 },
            BufferDesc::Text { max_str_len: 3 }.widen(BufferDesc::Binary { length: 2 })
        );
        // Same kind keeps the element size
        assert_eq!(
            BufferDesc::Text { max_str_len: 3 },
            BufferDesc::Text { max_str_len: 3 }.widen(BufferDesc::Text { max_str_len: 5 })
        );
    }
}
