use crate::{Field, NullableField, error::TooLargeBufferSize};

use super::{
    BufferDesc, VarColumn,
    column_with_indicator::{
        OptBitColumn, OptDateColumn, OptF64Column, OptI64Column, OptTimestampColumn,
    },
};

/// Buffer holding a single column of either a result set or paramater
#[derive(Debug, Clone)]
pub enum AnyBuffer {
    I64(OptI64Column),
    F64(OptF64Column),
    Bit(OptBitColumn),
    Date(OptDateColumn),
    Timestamp(OptTimestampColumn),
    /// UTF-8 encoded text.
    Text(VarColumn),
    Binary(VarColumn),
}

impl AnyBuffer {
    /// Map buffer description to actual buffer. Fails if the memory can not be allocated.
    pub fn try_from_desc(capacity: usize, desc: BufferDesc) -> Result<Self, TooLargeBufferSize> {
        let fallible_allocations = true;
        Self::impl_from_desc(capacity, desc, fallible_allocations)
    }

    /// Map buffer description to actual buffer.
    pub fn from_desc(capacity: usize, desc: BufferDesc) -> Self {
        let fallible_allocations = false;
        match Self::impl_from_desc(capacity, desc, fallible_allocations) {
            Ok(buffer) => buffer,
            Err(_) => unreachable!("Infallible allocations do not report errors"),
        }
    }

    fn impl_from_desc(
        capacity: usize,
        desc: BufferDesc,
        fallible_allocations: bool,
    ) -> Result<Self, TooLargeBufferSize> {
        let buffer = match (desc, fallible_allocations) {
            (BufferDesc::I64, true) => AnyBuffer::I64(OptI64Column::try_new(capacity)?),
            (BufferDesc::I64, false) => AnyBuffer::I64(OptI64Column::new(capacity)),
            (BufferDesc::F64, true) => AnyBuffer::F64(OptF64Column::try_new(capacity)?),
            (BufferDesc::F64, false) => AnyBuffer::F64(OptF64Column::new(capacity)),
            (BufferDesc::Bit, true) => AnyBuffer::Bit(OptBitColumn::try_new(capacity)?),
            (BufferDesc::Bit, false) => AnyBuffer::Bit(OptBitColumn::new(capacity)),
            (BufferDesc::Date, true) => AnyBuffer::Date(OptDateColumn::try_new(capacity)?),
            (BufferDesc::Date, false) => AnyBuffer::Date(OptDateColumn::new(capacity)),
            (BufferDesc::Timestamp, true) => {
                AnyBuffer::Timestamp(OptTimestampColumn::try_new(capacity)?)
            }
            (BufferDesc::Timestamp, false) => {
                AnyBuffer::Timestamp(OptTimestampColumn::new(capacity))
            }
            (BufferDesc::Text { max_str_len }, true) => {
                AnyBuffer::Text(VarColumn::try_new(capacity, max_str_len)?)
            }
            (BufferDesc::Text { max_str_len }, false) => {
                AnyBuffer::Text(VarColumn::new(capacity, max_str_len))
            }
            (BufferDesc::Binary { length }, true) => {
                AnyBuffer::Binary(VarColumn::try_new(capacity, length)?)
            }
            (BufferDesc::Binary { length }, false) => {
                AnyBuffer::Binary(VarColumn::new(capacity, length))
            }
        };
        Ok(buffer)
    }

    /// Description of the buffer layout. Allocating a new buffer from it, yields a buffer of the
    /// same type and element size.
    pub fn desc(&self) -> BufferDesc {
        match self {
            AnyBuffer::I64(_) => BufferDesc::I64,
            AnyBuffer::F64(_) => BufferDesc::F64,
            AnyBuffer::Bit(_) => BufferDesc::Bit,
            AnyBuffer::Date(_) => BufferDesc::Date,
            AnyBuffer::Timestamp(_) => BufferDesc::Timestamp,
            AnyBuffer::Text(col) => BufferDesc::Text {
                max_str_len: col.max_len(),
            },
            AnyBuffer::Binary(col) => BufferDesc::Binary {
                length: col.max_len(),
            },
        }
    }

    /// Maximum number of elements the buffer can hold.
    pub fn capacity(&self) -> usize {
        match self {
            AnyBuffer::I64(col) => col.capacity(),
            AnyBuffer::F64(col) => col.capacity(),
            AnyBuffer::Bit(col) => col.capacity(),
            AnyBuffer::Date(col) => col.capacity(),
            AnyBuffer::Timestamp(col) => col.capacity(),
            AnyBuffer::Text(col) | AnyBuffer::Binary(col) => col.capacity(),
        }
    }

    /// `true` if the element at `row_index` is `NULL`.
    pub fn is_null(&self, row_index: usize) -> bool {
        match self {
            AnyBuffer::I64(col) => col.get(row_index).is_none(),
            AnyBuffer::F64(col) => col.get(row_index).is_none(),
            AnyBuffer::Bit(col) => col.get(row_index).is_none(),
            AnyBuffer::Date(col) => col.get(row_index).is_none(),
            AnyBuffer::Timestamp(col) => col.get(row_index).is_none(),
            AnyBuffer::Text(col) | AnyBuffer::Binary(col) => col.value_at(row_index).is_none(),
        }
    }

    /// Materializes the element at `row_index`. Text which is not valid UTF-8 is converted
    /// lossy.
    ///
    /// Panics if `row_index` exceeds the capacity of the buffer.
    pub fn field_at(&self, row_index: usize) -> NullableField {
        match self {
            AnyBuffer::I64(col) => col.get(row_index).map(|&v| Field::Integer(v)),
            AnyBuffer::F64(col) => col.get(row_index).map(|&v| Field::Float(v)),
            AnyBuffer::Bit(col) => col.get(row_index).map(|&v| Field::Boolean(v)),
            AnyBuffer::Date(col) => col.get(row_index).map(|&v| Field::Date(v)),
            AnyBuffer::Timestamp(col) => col.get(row_index).map(|&v| Field::Timestamp(v)),
            AnyBuffer::Text(col) => col
                .value_at(row_index)
                .map(|bytes| Field::Text(String::from_utf8_lossy(bytes).into_owned())),
            AnyBuffer::Binary(col) => col
                .value_at(row_index)
                .map(|bytes| Field::Binary(bytes.to_vec())),
        }
    }

    /// `true` if `field` is of the type held by this buffer, regardless of its length.
    pub fn accepts(&self, field: &Field) -> bool {
        self.desc().is_same_kind(field.buffer_desc())
    }

    /// `true` if `field` can be written to the buffer without truncation.
    pub fn fits(&self, field: &Field) -> bool {
        match (self, field) {
            (AnyBuffer::Text(col), Field::Text(text)) => text.len() <= col.max_len(),
            (AnyBuffer::Binary(col), Field::Binary(bytes)) => bytes.len() <= col.max_len(),
            _ => self.accepts(field),
        }
    }

    /// Writes `value` at `row_index`. `None` writes `NULL`. Text and binary values larger than
    /// the element size are truncated.
    ///
    /// Panics if the value is of a type different from the type held by this buffer.
    pub fn set_field(&mut self, row_index: usize, value: Option<&Field>) {
        match (self, value) {
            (AnyBuffer::I64(col), Some(Field::Integer(v))) => col.set(row_index, Some(*v)),
            (AnyBuffer::F64(col), Some(Field::Float(v))) => col.set(row_index, Some(*v)),
            (AnyBuffer::Bit(col), Some(Field::Boolean(v))) => col.set(row_index, Some(*v)),
            (AnyBuffer::Date(col), Some(Field::Date(v))) => col.set(row_index, Some(*v)),
            (AnyBuffer::Timestamp(col), Some(Field::Timestamp(v))) => {
                col.set(row_index, Some(*v))
            }
            (AnyBuffer::Text(col), Some(Field::Text(text))) => {
                col.set_value(row_index, Some(text.as_bytes()))
            }
            (AnyBuffer::Binary(col), Some(Field::Binary(bytes))) => {
                col.set_value(row_index, Some(bytes))
            }
            (buffer, None) => buffer.fill_null(row_index, row_index + 1),
            (buffer, Some(field)) => panic!(
                "Value of type {:?} can not be written into a column buffer of type {:?}.",
                field.buffer_desc(),
                buffer.desc()
            ),
        }
    }

    /// Marks the elements in the range `from..to` as `NULL`.
    pub fn fill_null(&mut self, from: usize, to: usize) {
        match self {
            AnyBuffer::I64(col) => col.fill_null(from, to),
            AnyBuffer::F64(col) => col.fill_null(from, to),
            AnyBuffer::Bit(col) => col.fill_null(from, to),
            AnyBuffer::Date(col) => col.fill_null(from, to),
            AnyBuffer::Timestamp(col) => col.fill_null(from, to),
            AnyBuffer::Text(col) | AnyBuffer::Binary(col) => col.fill_null(from, to),
        }
    }

    /// Grows the element size of text and binary buffers, preserving the first `num_rows`
    /// values. Fixed sized buffers are left untouched.
    pub fn resize_max_len(&mut self, new_max_len: usize, num_rows: usize) {
        if let AnyBuffer::Text(col) | AnyBuffer::Binary(col) = self {
            col.resize_max_len(new_max_len, num_rows)
        }
    }
}
