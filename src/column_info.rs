/// Indication of whether a column is nullable or not.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum Nullability {
    /// Indicates that we do not know whether the column is Nullable or not.
    #[default]
    Unknown,
    /// The column may hold NULL values.
    Nullable,
    /// The column can not hold NULL values.
    NoNulls,
}

impl Nullability {
    /// `true` if the column is `Nullable` or it is not know whether the column is nullable. `false`
    /// if and only if the column is `NoNulls`.
    pub fn could_be_nullable(self) -> bool {
        match self {
            Nullability::Nullable | Nullability::Unknown => true,
            Nullability::NoNulls => false,
        }
    }
}

/// Enumeration over the SQL Data Types a driver may report for a result column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DataType {
    /// The type is not known.
    #[default]
    Unknown,
    /// `Char(n)`. Character string of fixed length.
    Char {
        /// Column size in characters (excluding terminating zero).
        length: usize,
    },
    /// `Varchar(n)`. Variable length character string. A length of `0` indicates no upper bound
    /// (e.g. `VARCHAR(MAX)`).
    Varchar { length: usize },
    /// `NVarchar(n)`. Variable length character string with a length given in UTF-16 code units.
    WVarchar { length: usize },
    /// `Numeric(p,s)`. Signed, exact, numeric value with a precision p and scale s.
    Numeric {
        /// Total number of digits.
        precision: usize,
        /// Number of decimal digits.
        scale: i16,
    },
    /// `Decimal(p,s)`. Signed, exact, numeric value with a precision of at least p and scale s.
    Decimal { precision: usize, scale: i16 },
    /// `TINYINT`. 8 Bit integer
    TinyInt,
    /// `Smallint`. 16 Bit Integer
    SmallInt,
    /// `Integer`. 32 Bit Integer
    Integer,
    /// `BIGINT`. 64 Bit integer
    BigInt,
    /// `Real`. Binary precision 24.
    Real,
    /// `Float(p)`. Binary precision of at least p.
    Float,
    /// `Double Precision`. Binary precision 53.
    Double,
    /// `BIT`. Single bit binary data.
    Bit,
    /// `Date`. Year, month, and day fields.
    Date,
    /// `Time`. Hour, minute, and second fields. Precision p indicates the seconds precision.
    Time { precision: i16 },
    /// `Timestamp`. Date and time of day.
    Timestamp { precision: i16 },
    /// `Binary(n)`. Fixed length binary data.
    Binary { length: usize },
    /// `Varbinary(n)`. Variable length binary data.
    Varbinary { length: usize },
    /// The driver returned a type, but it is not among the other types of these enumeration.
    Other {
        /// Size of column element
        column_size: usize,
        decimal_digits: i16,
    },
}

impl DataType {
    /// Maximum length of the textual representation of a value of this type in characters,
    /// excluding any terminating zero. `None` if not known.
    pub fn display_size(self) -> Option<usize> {
        let size = match self {
            DataType::Unknown | DataType::Other { .. } => return None,
            DataType::Char { length }
            | DataType::Varchar { length }
            | DataType::WVarchar { length } => length,
            // Binary data is displayed as hex string
            DataType::Binary { length } | DataType::Varbinary { length } => length * 2,
            // Sign and decimal point
            DataType::Numeric { precision, .. } | DataType::Decimal { precision, .. } => {
                precision + 2
            }
            DataType::TinyInt => 4,
            DataType::SmallInt => 6,
            DataType::Integer => 11,
            DataType::BigInt => 20,
            DataType::Real => 14,
            DataType::Float | DataType::Double => 24,
            DataType::Bit => 1,
            // e.g. 2024-02-29
            DataType::Date => 10,
            // e.g. 12:00:00.123
            DataType::Time { precision } => {
                if precision == 0 {
                    8
                } else {
                    9 + precision as usize
                }
            }
            // e.g. 2024-02-29 12:00:00.123
            DataType::Timestamp { precision } => {
                if precision == 0 {
                    19
                } else {
                    20 + precision as usize
                }
            }
        };
        Some(size)
    }
}

/// Describes a column of a result set, as reported by the driver.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ColumnInfo {
    /// Column name. May be empty if unavailable.
    pub name: String,
    /// Type of the column
    pub data_type: DataType,
    /// Indicates whether the column is nullable or not.
    pub nullability: Nullability,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, data_type: DataType, nullability: Nullability) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullability,
        }
    }
}
