use std::fmt;

use crate::buffers::BufferDesc;

/// Year, month and day, conforming to the rules of the Gregorian calendar.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    pub year: i16,
    pub month: u16,
    pub day: u16,
}

/// Date and time of day. `fraction` is given in nanoseconds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub year: i16,
    pub month: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    pub fraction: u32,
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:09}",
            self.year, self.month, self.day, self.hour, self.minute, self.second, self.fraction
        )
    }
}

/// A single value exchanged with the application, either as a parameter or as part of a result
/// row. Use [`NullableField`] to also represent `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(Date),
    Timestamp(Timestamp),
    /// Character data, UTF-8 encoded.
    Text(String),
    Binary(Vec<u8>),
}

/// `None` represents `NULL`.
pub type NullableField = Option<Field>;

impl Field {
    /// Description of the smallest buffer able to hold this value.
    pub fn buffer_desc(&self) -> BufferDesc {
        match self {
            Field::Integer(_) => BufferDesc::I64,
            Field::Float(_) => BufferDesc::F64,
            Field::Boolean(_) => BufferDesc::Bit,
            Field::Date(_) => BufferDesc::Date,
            Field::Timestamp(_) => BufferDesc::Timestamp,
            Field::Text(text) => BufferDesc::Text {
                max_str_len: text.len(),
            },
            Field::Binary(bytes) => BufferDesc::Binary {
                length: bytes.len(),
            },
        }
    }

    /// Converts the value, so it can be written into a buffer of the kind described by `desc`.
    /// Integers become floats for floating point buffers. Any value is rendered as text for text
    /// and binary buffers. Values already of the kind of `desc` and any other combination are
    /// returned unchanged.
    pub fn widen_to(&self, desc: BufferDesc) -> Field {
        match (desc, self) {
            (BufferDesc::F64, Field::Integer(i)) => Field::Float(*i as f64),
            (BufferDesc::Text { .. }, Field::Text(_))
            | (BufferDesc::Binary { .. }, Field::Binary(_)) => self.clone(),
            (BufferDesc::Text { .. }, other) => Field::Text(other.to_text()),
            (BufferDesc::Binary { .. }, other) => Field::Binary(other.to_text().into_bytes()),
            _ => self.clone(),
        }
    }

    /// Textual representation of the value, as it is send to a data source expecting character
    /// data. Booleans are rendered as `1` and `0`. Binary data which is not valid UTF-8 is
    /// converted lossy.
    pub fn to_text(&self) -> String {
        match self {
            Field::Integer(i) => i.to_string(),
            Field::Float(f) => f.to_string(),
            Field::Boolean(b) => if *b { "1" } else { "0" }.to_owned(),
            Field::Date(date) => date.to_string(),
            Field::Timestamp(timestamp) => timestamp.to_string(),
            Field::Text(text) => text.clone(),
            Field::Binary(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        if let Field::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        if let Field::Float(f) = self {
            Some(*f)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Field::Text(text) = self {
            Some(text)
        } else {
            None
        }
    }
}

impl From<i64> for Field {
    fn from(value: i64) -> Self {
        Field::Integer(value)
    }
}

impl From<i32> for Field {
    fn from(value: i32) -> Self {
        Field::Integer(value.into())
    }
}

impl From<f64> for Field {
    fn from(value: f64) -> Self {
        Field::Float(value)
    }
}

impl From<bool> for Field {
    fn from(value: bool) -> Self {
        Field::Boolean(value)
    }
}

impl From<Date> for Field {
    fn from(value: Date) -> Self {
        Field::Date(value)
    }
}

impl From<Timestamp> for Field {
    fn from(value: Timestamp) -> Self {
        Field::Timestamp(value)
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::Text(value.to_owned())
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::Text(value)
    }
}

impl From<Vec<u8>> for Field {
    fn from(value: Vec<u8>) -> Self {
        Field::Binary(value)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Date, Timestamp, buffers::BufferDesc};

    use super::Field;

    #[test]
    fn integers_widen_to_floats() {
        assert_eq!(Field::Float(3.0), Field::Integer(3).widen_to(BufferDesc::F64));
        assert_eq!(Field::Float(1.5), Field::Float(1.5).widen_to(BufferDesc::F64));
    }

    #[test]
    fn values_widen_to_text() {
        let text = BufferDesc::Text { max_str_len: 0 };
        let date = Date {
            year: 2024,
            month: 2,
            day: 29,
        };
        let timestamp = Timestamp {
            year: 1999,
            month: 12,
            day: 31,
            hour: 23,
            minute: 59,
            second: 58,
            fraction: 500_000_000,
        };

        assert_eq!(Field::from("42"), Field::Integer(42).widen_to(text));
        assert_eq!(Field::from("1"), Field::Boolean(true).widen_to(text));
        assert_eq!(Field::from("2024-02-29"), Field::Date(date).widen_to(text));
        assert_eq!(
            Field::from("1999-12-31 23:59:58.500000000"),
            Field::Timestamp(timestamp).widen_to(text)
        );
    }

    #[test]
    fn text_widens_to_binary() {
        assert_eq!(
            Field::Binary(b"abc".to_vec()),
            Field::from("abc").widen_to(BufferDesc::Binary { length: 0 })
        );
    }
}
