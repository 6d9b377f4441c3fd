//! Batch accumulator trait and a generic row → `RecordBatch` driver

use arrow::array::RecordBatch;
use arrow::error::ArrowError;
use indicatif::ProgressBar;

use crate::progress::rows_message;

/// Default batch size for flushing accumulated rows into a `RecordBatch`.
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Progress update interval (every N rows)
const UPDATE_INTERVAL: usize = 1_000;

/// Accumulator trait for batch processing of typed rows into Arrow `RecordBatch`.
pub trait Accumulator {
    type Row;

    /// Push a row into the accumulator
    fn push(&mut self, row: Self::Row);

    /// Number of rows currently buffered
    fn len(&self) -> usize;

    /// Check if buffer is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if buffer is full and should be flushed
    fn is_full(&self) -> bool {
        self.len() >= DEFAULT_BATCH_SIZE
    }

    /// Take buffered rows as a RecordBatch, resetting internal state
    fn take_batch(&mut self) -> Result<RecordBatch, ArrowError>;
}

/// Counts from one [`accumulate`] run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub rows: usize,
    pub batches: usize,
}

/// Drain a fallible row iterator into an accumulator, handing every full
/// batch (and the final partial one) to `emit`.
///
/// Stops at the first row error and returns it; rows already flushed stay
/// flushed.
pub fn accumulate<A, E>(
    rows: impl IntoIterator<Item = Result<A::Row, E>>,
    acc: &mut A,
    mut emit: impl FnMut(RecordBatch) -> Result<(), E>,
    pb: &ProgressBar,
) -> Result<BatchStats, E>
where
    A: Accumulator,
    E: From<ArrowError>,
{
    let mut stats = BatchStats::default();

    for row in rows {
        acc.push(row?);
        stats.rows += 1;

        if stats.rows % UPDATE_INTERVAL == 0 {
            pb.set_message(rows_message(stats.rows));
        }

        if acc.is_full() {
            emit(acc.take_batch()?)?;
            stats.batches += 1;
        }
    }
    if !acc.is_empty() {
        emit(acc.take_batch()?)?;
        stats.batches += 1;
    }
    pb.set_message(rows_message(stats.rows));
    Ok(stats)
}
