use std::cmp::min;

use crate::error::TooLargeBufferSize;

use super::indicator::{Indicator, NULL_DATA};

/// A buffer holding up to `capacity` elements of variable length, each with up to `max_len`
/// bytes. Used for both text and binary data. Since elements of this type have variable length an
/// indicator buffer is always present, holding either the length of an element or `NULL`.
///
/// Values larger than `max_len` are truncated upon writing, yet the indicator keeps track of their
/// complete length.
#[derive(Debug, Clone)]
pub struct VarColumn {
    /// Maximum length of an element in bytes.
    max_len: usize,
    values: Vec<u8>,
    indicators: Vec<isize>,
}

impl VarColumn {
    /// Allocates a buffer for `capacity` elements with `max_len` bytes each. All elements are
    /// initialized to `NULL`.
    pub fn new(capacity: usize, max_len: usize) -> Self {
        VarColumn {
            max_len,
            values: vec![0; capacity * max_len],
            indicators: vec![NULL_DATA; capacity],
        }
    }

    /// Like [`Self::new`], but fails instead of aborting the process if the memory can not be
    /// allocated.
    pub fn try_new(capacity: usize, max_len: usize) -> Result<Self, TooLargeBufferSize> {
        let error = || TooLargeBufferSize {
            num_elements: capacity,
            element_size: max_len,
        };
        let len = capacity.checked_mul(max_len).ok_or_else(error)?;
        let mut values = Vec::new();
        values.try_reserve_exact(len).map_err(|_| error())?;
        values.resize(len, 0);
        let mut indicators = Vec::new();
        indicators.try_reserve_exact(capacity).map_err(|_| error())?;
        indicators.resize(capacity, NULL_DATA);
        Ok(VarColumn {
            max_len,
            values,
            indicators,
        })
    }

    /// Maximum number of elements the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.indicators.len()
    }

    /// Maximum length of a single element in bytes.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Return the value for the given row index. Truncated values are returned as far as they
    /// are in the buffer.
    ///
    /// Panics if `row_index` is not smaller than the capacity of the buffer.
    pub fn value_at(&self, row_index: usize) -> Option<&[u8]> {
        let length = match self.indicator_at(row_index) {
            Indicator::Null => return None,
            Indicator::NoTotal => self.max_len,
            Indicator::Length(length) => min(self.max_len, length),
        };
        let offset = row_index * self.max_len;
        Some(&self.values[offset..offset + length])
    }

    /// Indicator of the element at the given row index. In case of truncated values it holds the
    /// complete length, not the length in the buffer.
    pub fn indicator_at(&self, row_index: usize) -> Indicator {
        Indicator::from_isize(self.indicators[row_index])
    }

    /// `true` if the value at `row_index` did not fit completely into the buffer.
    pub fn is_truncated(&self, row_index: usize) -> bool {
        self.indicator_at(row_index).is_truncated(self.max_len)
    }

    /// Writes a value (or `NULL`) at `row_index`. Values larger than [`Self::max_len`] are
    /// truncated.
    pub fn set_value(&mut self, row_index: usize, value: Option<&[u8]>) {
        match value {
            Some(bytes) => {
                let offset = row_index * self.max_len;
                let length_in_buffer = min(bytes.len(), self.max_len);
                self.values[offset..offset + length_in_buffer]
                    .copy_from_slice(&bytes[..length_in_buffer]);
                self.indicators[row_index] = Indicator::Length(bytes.len()).to_isize();
            }
            None => self.indicators[row_index] = NULL_DATA,
        }
    }

    /// Marks the elements in the range `from..to` as `NULL`.
    pub fn fill_null(&mut self, from: usize, to: usize) {
        for indicator in &mut self.indicators[from..to] {
            *indicator = NULL_DATA;
        }
    }

    /// Changes the maximum element length the buffer can hold. This operation is useful if you
    /// find an unexpected large input during insertion. All values in the buffer will be copied
    /// over to a new buffer.
    ///
    /// # Parameters
    ///
    /// * `new_max_len`: New maximum element length in bytes.
    /// * `num_rows`: Number of valid rows currently stored in this buffer.
    pub fn resize_max_len(&mut self, new_max_len: usize, num_rows: usize) {
        let mut new_values = vec![0; new_max_len * self.capacity()];
        // Copy values from old to new buffer.
        let max_copy_length = min(self.max_len, new_max_len);
        for (old_row, new_row) in self
            .values
            .chunks_exact(self.max_len.max(1))
            .zip(new_values.chunks_exact_mut(new_max_len.max(1)))
            .take(num_rows)
        {
            new_row[..max_copy_length].copy_from_slice(&old_row[..max_copy_length]);
        }
        self.values = new_values;
        self.max_len = new_max_len;
    }

    /// Raw access to the value bytes and indicators, for drivers writing whole batches at once.
    /// Element `n` starts at byte `n * max_len`.
    pub fn raw_mut(&mut self) -> (&mut [u8], &mut [isize]) {
        (&mut self.values, &mut self.indicators)
    }
}

#[cfg(test)]
mod tests {
    use super::VarColumn;

    #[test]
    fn values_and_nulls() {
        let mut column = VarColumn::new(3, 5);
        column.set_value(0, Some(b"Hello"));
        column.set_value(1, None);
        column.set_value(2, Some(b""));

        assert_eq!(Some(&b"Hello"[..]), column.value_at(0));
        assert_eq!(None, column.value_at(1));
        assert_eq!(Some(&b""[..]), column.value_at(2));
    }

    #[test]
    fn too_long_values_are_truncated() {
        let mut column = VarColumn::new(1, 3);

        column.set_value(0, Some(b"Hello"));

        assert_eq!(Some(&b"Hel"[..]), column.value_at(0));
        assert!(column.is_truncated(0));
    }

    #[test]
    fn resize_preserves_valid_rows() {
        let mut column = VarColumn::new(3, 2);
        column.set_value(0, Some(b"ab"));
        column.set_value(1, Some(b"c"));

        column.resize_max_len(6, 2);
        column.set_value(2, Some(b"defghi"));

        assert_eq!(6, column.max_len());
        assert_eq!(Some(&b"ab"[..]), column.value_at(0));
        assert_eq!(Some(&b"c"[..]), column.value_at(1));
        assert_eq!(Some(&b"defghi"[..]), column.value_at(2));
    }

    #[test]
    fn resize_column_without_any_length() {
        let mut column = VarColumn::new(2, 0);
        column.set_value(0, None);

        column.resize_max_len(4, 1);
        column.set_value(1, Some(b"abcd"));

        assert_eq!(None, column.value_at(0));
        assert_eq!(Some(&b"abcd"[..]), column.value_at(1));
    }

    #[test]
    fn allocation_of_absurd_buffer_fails_gracefully() {
        assert!(VarColumn::try_new(usize::MAX / 2, 4).is_err());
    }
}
