use std::borrow::Cow;

use log::debug;

use crate::{
    Field, NullableField,
    buffers::{AnyBuffer, BufferDesc, ColumnarBuffer},
};

/// Collects row wise parameter sets into a column wise buffer, so they can be send to the driver in
/// bulk.
///
/// The buffer is allocated once and reused for every batch. The type of each column is inferred
/// from the first non-`NULL` value within a batch. A value of a different type widens the column
/// in place (see [`BufferDesc::widen`]), converting the values already staged. Batch boundaries
/// therefore only depend on the number of parameter sets.
#[derive(Debug)]
pub struct ParameterBatchAccumulator {
    // We maintain the invariant that all columns have the capacity of the batch and the number of
    // rows of the batch reflects the number of staged parameter sets.
    batch: ColumnarBuffer,
    /// `true` for each column holding at least one non-`NULL` value in the current batch.
    has_values: Vec<bool>,
}

impl ParameterBatchAccumulator {
    /// An empty accumulator for `num_params` parameters, considering a batch complete after
    /// `parameter_sets_to_buffer` parameter sets.
    pub fn new(num_params: usize, parameter_sets_to_buffer: usize) -> Self {
        // Until we see the first value, we have no idea about the type of the column. Text buffers
        // without any element size are cheap, and the most common type of parameter.
        let descs = (0..num_params).map(|_| BufferDesc::Text { max_str_len: 0 });
        Self {
            batch: ColumnarBuffer::from_descs(parameter_sets_to_buffer, descs),
            has_values: vec![false; num_params],
        }
    }

    /// Number of parameter sets staged in the current batch.
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Number of parameter sets which complete a batch.
    pub fn capacity(&self) -> usize {
        self.batch.capacity()
    }

    pub fn num_params(&self) -> usize {
        self.batch.num_cols()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    /// `true` if the batch is complete and must be send, before another parameter set can be
    /// added.
    pub fn is_full(&self) -> bool {
        self.batch.num_rows() == self.batch.capacity()
    }

    /// Appends `values` as the next parameter set of the current batch.
    ///
    /// Panics if the batch is already full, or if the number of values does not match the number
    /// of parameters. Callers are expected to send the batch and [`Self::clear`] it once it is
    /// full.
    pub fn add(&mut self, values: &[NullableField]) {
        if self.is_full() {
            panic!("Trying to insert parameter sets into a batch beyond its capacity.")
        }
        assert_eq!(
            self.num_params(),
            values.len(),
            "Parameter set must contain one element for each parameter."
        );
        let row_index = self.batch.num_rows();
        for (index, value) in values.iter().enumerate() {
            let value = value.as_ref().map(|field| self.prepare_column(index, field));
            self.batch
                .column_mut(index)
                .set_field(row_index, value.as_deref());
        }
        self.batch.set_num_rows(row_index + 1);
    }

    /// Makes sure the column at `index` can hold `field` without truncation. Returns `field`
    /// converted to the kind of the column.
    fn prepare_column<'a>(&mut self, index: usize, field: &'a Field) -> Cow<'a, Field> {
        let current = self.batch.column(index).desc();
        let target = if self.has_values[index] {
            current.widen(field.buffer_desc())
        } else {
            field.buffer_desc()
        };
        if !current.is_same_kind(target) {
            debug!(
                "Parameter {} changes its buffer type from {current:?} to {target:?}.",
                index + 1
            );
            self.retype_column(index, target);
        }
        self.has_values[index] = true;

        let field = if field.buffer_desc().is_same_kind(target) {
            Cow::Borrowed(field)
        } else {
            Cow::Owned(field.widen_to(target))
        };

        let num_rows = self.batch.num_rows();
        let column = self.batch.column_mut(index);
        if !column.fits(&field) {
            // Column buffer is not large enough to hold the element. We must allocate a larger
            // buffer in order to hold it. Grow a bit more than needed, to not reallocate for each
            // slightly larger value.
            let new_max_len = (element_len(&field) as f64 * 1.2) as usize;
            debug!(
                "Growing element size of parameter {} to {new_max_len} bytes.",
                index + 1
            );
            column.resize_max_len(new_max_len, num_rows);
        }
        field
    }

    /// Replaces the column at `index` with a buffer of the kind of `desc`, converting the staged
    /// values.
    fn retype_column(&mut self, index: usize, desc: BufferDesc) {
        let num_rows = self.batch.num_rows();
        let staged: Vec<NullableField> = self
            .batch
            .column_values(index, 0..num_rows)
            .into_iter()
            .map(|value| value.map(|field| field.widen_to(desc)))
            .collect();
        let max_len = staged.iter().flatten().map(element_len).max().unwrap_or(0);
        let desc = match desc {
            BufferDesc::Text { .. } => BufferDesc::Text {
                max_str_len: max_len,
            },
            BufferDesc::Binary { .. } => BufferDesc::Binary { length: max_len },
            fixed => fixed,
        };
        let mut retyped = AnyBuffer::from_desc(self.batch.capacity(), desc);
        for (row_index, value) in staged.iter().enumerate() {
            retyped.set_field(row_index, value.as_ref());
        }
        self.batch.replace_column(index, retyped);
    }

    /// The batch of staged parameter sets.
    pub fn batch(&self) -> &ColumnarBuffer {
        &self.batch
    }

    /// Discards all staged parameter sets, so the buffers can be reused for the next batch. Column
    /// types are kept.
    pub fn clear(&mut self) {
        self.batch.set_num_rows(0);
        for has_values in &mut self.has_values {
            *has_values = false;
        }
    }
}

/// Length of text and binary values in bytes. Zero for fixed sized values.
fn element_len(field: &Field) -> usize {
    match field {
        Field::Text(text) => text.len(),
        Field::Binary(bytes) => bytes.len(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use crate::{Date, Field, buffers::BufferDesc};

    use super::ParameterBatchAccumulator;

    fn int(i: i64) -> Option<Field> {
        Some(Field::Integer(i))
    }

    #[test]
    fn batch_is_full_after_capacity_rows() {
        let mut acc = ParameterBatchAccumulator::new(1, 2);

        acc.add(&[int(1)]);
        assert!(!acc.is_full());
        acc.add(&[int(2)]);

        assert!(acc.is_full());
        assert_eq!(vec![int(1)], acc.batch().row(0));
        assert_eq!(vec![int(2)], acc.batch().row(1));
    }

    #[test]
    fn short_batch_contains_exactly_the_staged_rows() {
        let mut acc = ParameterBatchAccumulator::new(1, 3);
        acc.add(&[int(1)]);
        acc.add(&[int(2)]);
        acc.clear();

        acc.add(&[int(3)]);

        assert_eq!(1, acc.batch().num_rows());
        assert_eq!(vec![int(3)], acc.batch().column_values(0, 0..1));
    }

    #[test]
    fn leading_nulls_are_kept_then_column_is_typed() {
        let mut acc = ParameterBatchAccumulator::new(2, 10);

        acc.add(&[None, None]);
        acc.add(&[int(5), Some(Field::from("five"))]);

        assert_eq!(BufferDesc::I64, acc.batch().column(0).desc());
        assert_eq!(vec![None, None], acc.batch().row(0));
        assert_eq!(vec![int(5), Some(Field::from("five"))], acc.batch().row(1));
    }

    #[test]
    fn long_text_grows_column_and_preserves_staged_rows() {
        let mut acc = ParameterBatchAccumulator::new(1, 10);
        acc.add(&[Some(Field::from("a"))]);

        acc.add(&[Some(Field::from("Hello, World!"))]);

        assert!(acc.batch().column(0).desc() == BufferDesc::Text { max_str_len: 15 });
        assert_eq!(
            vec![Some(Field::from("a")), Some(Field::from("Hello, World!"))],
            acc.batch().column_values(0, 0..2)
        );
    }

    #[test]
    fn integers_and_floats_share_a_float_column() {
        let mut acc = ParameterBatchAccumulator::new(1, 10);

        acc.add(&[int(1)]);
        acc.add(&[Some(Field::Float(1.5))]);
        acc.add(&[int(2)]);

        assert_eq!(BufferDesc::F64, acc.batch().column(0).desc());
        assert_eq!(
            vec![
                Some(Field::Float(1.0)),
                Some(Field::Float(1.5)),
                Some(Field::Float(2.0))
            ],
            acc.batch().column_values(0, 0..3)
        );
    }

    #[test]
    fn mixed_kinds_are_converted_to_text() {
        let mut acc = ParameterBatchAccumulator::new(1, 10);
        let date = Date {
            year: 2020,
            month: 1,
            day: 2,
        };

        acc.add(&[int(12345)]);
        acc.add(&[None]);
        acc.add(&[Some(Field::Date(date))]);
        acc.add(&[Some(Field::Boolean(false))]);

        assert!(matches!(
            acc.batch().column(0).desc(),
            BufferDesc::Text { .. }
        ));
        assert_eq!(
            vec![
                Some(Field::from("12345")),
                None,
                Some(Field::from("2020-01-02")),
                Some(Field::from("0"))
            ],
            acc.batch().column_values(0, 0..4)
        );
    }

    #[test]
    fn column_type_is_inferred_anew_for_each_batch() {
        let mut acc = ParameterBatchAccumulator::new(1, 10);
        acc.add(&[int(1)]);
        acc.add(&[Some(Field::Float(0.5))]);
        acc.clear();

        acc.add(&[int(7)]);

        assert_eq!(BufferDesc::I64, acc.batch().column(0).desc());
        assert_eq!(vec![int(7)], acc.batch().row(0));
    }

    #[test]
    #[should_panic(expected = "beyond its capacity")]
    fn adding_to_full_batch_panics() {
        let mut acc = ParameterBatchAccumulator::new(1, 1);
        acc.add(&[int(1)]);
        acc.add(&[int(2)]);
    }
}
