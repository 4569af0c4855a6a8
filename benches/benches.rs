use std::{hint::black_box, iter};

use bulk_cursor::{
    Field, ParameterBatchAccumulator,
    buffers::{BufferDesc, ColumnarBuffer},
};
use criterion::{Criterion, criterion_group, criterion_main};

fn falliable_buffer_allocation(capacity: usize, max_str_len: usize) {
    let desc = BufferDesc::Text { max_str_len };
    ColumnarBuffer::try_from_descs(capacity, iter::once(desc)).unwrap();
}

fn infalliable_buffer_allocation(capacity: usize, max_str_len: usize) {
    let desc = BufferDesc::Text { max_str_len };
    ColumnarBuffer::from_descs(capacity, iter::once(desc));
}

fn accumulate_parameter_sets(num_sets: i64, parameter_sets_to_buffer: usize) {
    let mut accumulator = ParameterBatchAccumulator::new(2, parameter_sets_to_buffer);
    for i in 0..num_sets {
        accumulator.add(&[
            Some(Field::Integer(i)),
            Some(Field::Text(format!("Parameter set {i}"))),
        ]);
        if accumulator.is_full() {
            accumulator.clear();
        }
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("fallibale buffer allocation", |b| {
        b.iter(|| {
            let capacity = 1000;
            let max_str_len = 65536;
            falliable_buffer_allocation(black_box(capacity), black_box(max_str_len))
        })
    });
    c.bench_function("infallibale buffer allocation", |b| {
        b.iter(|| {
            let capacity = 1000;
            let max_str_len = 65536;
            infalliable_buffer_allocation(black_box(capacity), black_box(max_str_len))
        })
    });
    c.bench_function("accumulate parameter sets", |b| {
        b.iter(|| accumulate_parameter_sets(black_box(10_000), black_box(1000)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
