//! # Bulk cursor
//!
//! Sits between an application and a row oriented database driver. Statements are prepared and
//! executed through a [`Cursor`]. Parameter sets are accumulated into column wise buffers and send
//! to the driver in bulk, result sets are fetched batch by batch into reusable column buffers and
//! handed out row by row (or batch by batch) through a [`ResultSet`].
//!
//! The driver itself is not part of this crate. Anything implementing [`driver::Connection`] and
//! [`driver::Statement`] can be plugged in.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bulk_cursor::{driver::Connection, Cursor, CursorOptions, Error, Field};
//!
//! fn insert_and_count(connection: Arc<impl Connection>) -> Result<i64, Error> {
//!     let mut cursor = Cursor::new(connection, CursorOptions::default())?;
//!     cursor.prepare("INSERT INTO Birthdays (name, year) VALUES (?, ?)")?;
//!     cursor.add_parameter_set(&[Some(Field::from("Bernd")), Some(Field::Integer(1979))])?;
//!     cursor.add_parameter_set(&[Some(Field::from("Hilde")), None])?;
//!     cursor.execute()?;
//!     cursor.row_count()
//! }
//! ```

mod buffer_size;
mod column_info;
mod cursor;
mod error;
mod fetch;
mod field;
mod parameters;
mod query;
mod result_set;

pub mod buffers;
pub mod driver;

pub use self::{
    buffer_size::BufferSize,
    column_info::{ColumnInfo, DataType, Nullability},
    cursor::{Cursor, CursorOptions},
    error::{Error, ParameterError, StateError, TooLargeBufferSize},
    fetch::FetchState,
    field::{Date, Field, NullableField, Timestamp},
    parameters::ParameterBatchAccumulator,
    query::Query,
    result_set::{ResultSet, Rows},
};
