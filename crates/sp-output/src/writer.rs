//! The `ResponseSink` trait implemented by all backends.

use crate::{OutputResult, RecordLayout, ResponseRecord};

/// Append-only destination for response batches.
///
/// Sinks are shared by every request thread, so `append_batch` takes
/// `&self` and each backend serialises appends internally.  A batch is
/// either written completely or reported as failed; batches are never
/// interleaved with each other.
pub trait ResponseSink: Send + Sync {
    /// Column layout used for every row.
    fn layout(&self) -> &RecordLayout;

    /// Create the destination and its header if absent.
    ///
    /// Idempotent.
    fn init(&self) -> OutputResult<()>;

    /// Durably append one submission's rows.
    fn append_batch(&self, records: &[ResponseRecord]) -> OutputResult<()>;
}
