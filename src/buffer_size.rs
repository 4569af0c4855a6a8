/// Target capacity of a single batch, used for both parameter and result buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferSize {
    /// Fixed number of rows per batch.
    Rows(usize),
    /// Number of rows is derived from a memory budget and the width of a row.
    Megabytes(usize),
}

const BYTES_PER_MEGABYTE: usize = 1 << 20;

impl BufferSize {
    /// Number of rows fitting into a batch with this size, if each row takes up `bytes_per_row`
    /// bytes. Always at least one.
    pub fn rows_for(self, bytes_per_row: usize) -> usize {
        let rows = match self {
            BufferSize::Rows(rows) => rows,
            BufferSize::Megabytes(megabytes) => {
                megabytes.saturating_mul(BYTES_PER_MEGABYTE) / bytes_per_row.max(1)
            }
        };
        rows.max(1)
    }

    /// `false` if the size would not allow for any rows.
    pub fn is_valid(self) -> bool {
        match self {
            BufferSize::Rows(rows) => rows >= 1,
            BufferSize::Megabytes(megabytes) => megabytes >= 1,
        }
    }
}

impl Default for BufferSize {
    fn default() -> Self {
        BufferSize::Rows(1000)
    }
}
