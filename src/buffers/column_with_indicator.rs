use std::mem::size_of;

use crate::{Date, Timestamp, error::TooLargeBufferSize};

use super::indicator::NULL_DATA;

pub type OptF64Column = ColumnWithIndicator<f64>;
pub type OptI64Column = ColumnWithIndicator<i64>;
pub type OptBitColumn = ColumnWithIndicator<bool>;
pub type OptDateColumn = ColumnWithIndicator<Date>;
pub type OptTimestampColumn = ColumnWithIndicator<Timestamp>;

/// Column buffer for fixed sized type, also holding an indicator buffer to handle NULL.
#[derive(Debug, Clone)]
pub struct ColumnWithIndicator<T> {
    values: Vec<T>,
    indicators: Vec<isize>,
}

impl<T> ColumnWithIndicator<T>
where
    T: Default + Clone,
{
    /// Allocates a buffer for `capacity` elements. All elements are initialized to `NULL`.
    pub fn new(capacity: usize) -> Self {
        Self {
            values: vec![T::default(); capacity],
            indicators: vec![NULL_DATA; capacity],
        }
    }

    /// Like [`Self::new`], but fails instead of aborting the process if the memory can not be
    /// allocated.
    pub fn try_new(capacity: usize) -> Result<Self, TooLargeBufferSize> {
        let error = || TooLargeBufferSize {
            num_elements: capacity,
            element_size: size_of::<T>(),
        };
        let mut values = Vec::new();
        values.try_reserve_exact(capacity).map_err(|_| error())?;
        values.resize(capacity, T::default());
        let mut indicators = Vec::new();
        indicators.try_reserve_exact(capacity).map_err(|_| error())?;
        indicators.resize(capacity, NULL_DATA);
        Ok(Self { values, indicators })
    }
}

impl<T> ColumnWithIndicator<T> {
    /// Maximum number of elements the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.indicators.len()
    }

    /// Value at `row_index`. `None` if the value is `NULL`.
    ///
    /// Panics if `row_index` is not smaller than the capacity of the buffer. Whether the row has
    /// been filled by the last batch is up to the caller to check.
    pub fn get(&self, row_index: usize) -> Option<&T> {
        if self.indicators[row_index] == NULL_DATA {
            None
        } else {
            Some(&self.values[row_index])
        }
    }

    /// Write a value (or `NULL`) at `row_index`.
    pub fn set(&mut self, row_index: usize, value: Option<T>) {
        match value {
            Some(value) => {
                self.values[row_index] = value;
                self.indicators[row_index] = 0;
            }
            None => self.indicators[row_index] = NULL_DATA,
        }
    }

    /// Iterator over the first `num_rows` elements.
    pub fn iter(&self, num_rows: usize) -> NullableSlice<'_, T> {
        NullableSlice {
            indicators: &self.indicators[0..num_rows],
            values: &self.values[0..num_rows],
        }
    }

    /// Marks the elements in the range `from..to` as `NULL`.
    pub fn fill_null(&mut self, from: usize, to: usize) {
        for indicator in &mut self.indicators[from..to] {
            *indicator = NULL_DATA;
        }
    }

    /// Raw access to values and indicators, for drivers writing whole batches at once. Any
    /// indicator other than [`NULL_DATA`] marks the value as present.
    pub fn raw_mut(&mut self) -> (&mut [T], &mut [isize]) {
        (&mut self.values, &mut self.indicators)
    }
}

/// Iterates over the elements of a [`ColumnWithIndicator`], yielding `None` for `NULL`.
#[derive(Debug, Clone, Copy)]
pub struct NullableSlice<'a, T> {
    indicators: &'a [isize],
    values: &'a [T],
}

impl<'a, T> NullableSlice<'a, T> {
    /// Raw values, including those marked as `NULL`.
    pub fn raw_values(&self) -> (&'a [T], &'a [isize]) {
        (self.values, self.indicators)
    }
}

impl<'a, T> Iterator for NullableSlice<'a, T> {
    type Item = Option<&'a T>;

    fn next(&mut self) -> Option<Self::Item> {
        let (&ind, indicators) = self.indicators.split_first()?;
        let (value, values) = self.values.split_first()?;
        self.indicators = indicators;
        self.values = values;
        Some(if ind == NULL_DATA { None } else { Some(value) })
    }
}

#[cfg(test)]
mod tests {
    use super::ColumnWithIndicator;

    #[test]
    fn new_column_is_null() {
        let column = ColumnWithIndicator::<i64>::new(3);
        assert_eq!(vec![None, None, None], column.iter(3).collect::<Vec<_>>());
    }

    #[test]
    fn iterate_values_and_nulls() {
        let mut column = ColumnWithIndicator::new(4);
        column.set(0, Some(1.5));
        column.set(1, None);
        column.set(2, Some(-2.0));

        let values: Vec<_> = column.iter(3).map(|v| v.copied()).collect();

        assert_eq!(vec![Some(1.5), None, Some(-2.0)], values);
    }

    #[test]
    fn fill_null_keeps_rows_outside_of_range() {
        let mut column = ColumnWithIndicator::new(3);
        for row in 0..3 {
            column.set(row, Some(row as i64));
        }

        column.fill_null(1, 2);

        assert_eq!(Some(&0), column.get(0));
        assert_eq!(None, column.get(1));
        assert_eq!(Some(&2), column.get(2));
    }
}
