//! Column buffers holding batches of parameters or result rows.
//!
//! Buffers are allocated once and reused for every batch. A [`ColumnarBuffer`] knows how many of
//! its rows are valid. Rows beyond that are never handed out.

mod any_buffer;
mod column_with_indicator;
mod columnar;
mod description;
mod indicator;
mod var_column;

pub use self::{
    any_buffer::AnyBuffer,
    column_with_indicator::{
        ColumnWithIndicator, NullableSlice, OptBitColumn, OptDateColumn, OptF64Column,
        OptI64Column, OptTimestampColumn,
    },
    columnar::ColumnarBuffer,
    description::BufferDesc,
    indicator::{Indicator, NO_TOTAL, NULL_DATA},
    var_column::VarColumn,
};
