use std::ops::Range;

use crate::{Error, NullableField};

use super::{AnyBuffer, BufferDesc};

/// A columnar buffer used to exchange batches of rows with the driver, either as parameters or as
/// result rows.
///
/// The buffer is allocated once, with a fixed capacity, and reused for every batch. Only the first
/// [`Self::num_rows`] rows are valid. Reading beyond them panics, rather than handing out values of
/// a previous batch.
#[derive(Debug, Clone)]
pub struct ColumnarBuffer {
    /// Number of valid rows in the buffer.
    num_rows: usize,
    /// aka: batch size, row array size
    capacity: usize,
    columns: Vec<AnyBuffer>,
}

impl ColumnarBuffer {
    /// Allocates a [`ColumnarBuffer`] fitting the buffer descriptions.
    pub fn from_descs(capacity: usize, descs: impl IntoIterator<Item = BufferDesc>) -> Self {
        let columns = descs
            .into_iter()
            .map(|desc| AnyBuffer::from_desc(capacity, desc))
            .collect();
        ColumnarBuffer {
            num_rows: 0,
            capacity,
            columns,
        }
    }

    /// Allocates a [`ColumnarBuffer`] fitting the buffer descriptions. If not enough memory is
    /// available to allocate the buffers this function fails with
    /// [`Error::TooLargeColumnBufferSize`]. This function is slower than [`Self::from_descs`]
    /// which would just panic if not enough memory is available for allocation.
    pub fn try_from_descs(
        capacity: usize,
        descs: impl IntoIterator<Item = BufferDesc>,
    ) -> Result<Self, Error> {
        let columns = descs
            .into_iter()
            .enumerate()
            .map(|(buffer_index, desc)| {
                AnyBuffer::try_from_desc(capacity, desc)
                    .map_err(|source| source.add_context(buffer_index))
            })
            .collect::<Result<_, _>>()?;
        Ok(ColumnarBuffer {
            num_rows: 0,
            capacity,
            columns,
        })
    }

    /// Number of valid rows in the buffer.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Maximum number of rows the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn num_cols(&self) -> usize {
        self.columns.len()
    }

    /// Set number of valid rows in the buffer. May not be larger than the capacity.
    pub fn set_num_rows(&mut self, num_rows: usize) {
        if num_rows > self.capacity {
            panic!(
                "Columnar buffer may not be resized to a value higher than the maximum number of \
                rows initially specified in the constructor."
            );
        }
        self.num_rows = num_rows;
    }

    /// Use this method to gain read access to the actual column data.
    pub fn column(&self, buffer_index: usize) -> &AnyBuffer {
        &self.columns[buffer_index]
    }

    /// Use this method to gain write access to the actual column data. Drivers use this to fill
    /// the buffer during fetch.
    pub fn column_mut(&mut self, buffer_index: usize) -> &mut AnyBuffer {
        &mut self.columns[buffer_index]
    }

    /// Replaces the buffer at `buffer_index`. The new column must have the same capacity.
    pub fn replace_column(&mut self, buffer_index: usize, column: AnyBuffer) {
        assert_eq!(self.capacity, column.capacity());
        self.columns[buffer_index] = column;
    }

    /// Descriptions of all column buffers.
    pub fn descs(&self) -> Vec<BufferDesc> {
        self.columns.iter().map(AnyBuffer::desc).collect()
    }

    /// Size of a single row in bytes, including indicators.
    pub fn bytes_per_row(&self) -> usize {
        self.columns
            .iter()
            .map(|column| column.desc().bytes_per_row())
            .sum()
    }

    /// Materializes the row at `row_index`.
    ///
    /// Panics if `row_index` is not smaller than [`Self::num_rows`].
    pub fn row(&self, row_index: usize) -> Vec<NullableField> {
        assert!(
            row_index < self.num_rows,
            "Row index {row_index} is out of bounds. The buffer holds {} valid rows.",
            self.num_rows
        );
        self.columns
            .iter()
            .map(|column| column.field_at(row_index))
            .collect()
    }

    /// Materializes the values of the column at `buffer_index` for the given range of rows.
    ///
    /// Panics if the range exceeds [`Self::num_rows`].
    pub fn column_values(&self, buffer_index: usize, rows: Range<usize>) -> Vec<NullableField> {
        assert!(
            rows.end <= self.num_rows,
            "Row range {rows:?} is out of bounds. The buffer holds {} valid rows.",
            self.num_rows
        );
        let column = &self.columns[buffer_index];
        rows.map(|row_index| column.field_at(row_index)).collect()
    }

    /// Writes one value per column at `row_index`. Does not change the number of valid rows.
    ///
    /// Panics if the number of values does not match the number of columns, or if a value does
    /// not match the type of its column buffer.
    pub fn set_row(&mut self, row_index: usize, values: &[NullableField]) {
        assert_eq!(
            self.columns.len(),
            values.len(),
            "Row must contain one element for each column."
        );
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.set_field(row_index, value.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, Field, buffers::BufferDesc};

    use super::ColumnarBuffer;

    #[test]
    fn rows_are_materialized_across_columns() {
        let mut buffer =
            ColumnarBuffer::from_descs(2, [BufferDesc::I64, BufferDesc::Text { max_str_len: 5 }]);
        buffer.set_row(0, &[Some(Field::Integer(42)), None]);
        buffer.set_row(1, &[None, Some(Field::from("Hello"))]);
        buffer.set_num_rows(2);

        assert_eq!(vec![Some(Field::Integer(42)), None], buffer.row(0));
        assert_eq!(
            vec![None, Some(Field::from("Hello"))],
            buffer.column_values(1, 0..2)
        );
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn rows_beyond_num_rows_are_not_readable() {
        let mut buffer = ColumnarBuffer::from_descs(3, [BufferDesc::I64]);
        buffer.set_row(0, &[Some(Field::Integer(1))]);
        buffer.set_row(1, &[Some(Field::Integer(2))]);
        buffer.set_num_rows(1);

        buffer.row(1);
    }

    #[test]
    #[should_panic(expected = "higher than the maximum number of rows")]
    fn num_rows_may_not_exceed_capacity() {
        let mut buffer = ColumnarBuffer::from_descs(3, [BufferDesc::I64]);
        buffer.set_num_rows(4);
    }

    #[test]
    fn allocation_error_names_column() {
        let result = ColumnarBuffer::try_from_descs(
            usize::MAX / 4,
            [
                BufferDesc::Bit,
                BufferDesc::Text {
                    max_str_len: 1 << 20,
                },
            ],
        );

        assert!(matches!(
            result,
            Err(Error::TooLargeColumnBufferSize { buffer_index: 0, .. })
                | Err(Error::TooLargeColumnBufferSize { buffer_index: 1, .. })
        ));
    }

    #[test]
    fn bytes_per_row_includes_indicators() {
        let buffer =
            ColumnarBuffer::from_descs(1, [BufferDesc::I64, BufferDesc::Binary { length: 10 }]);

        assert_eq!(8 + 8 + 10 + 8, buffer.bytes_per_row());
    }
}
