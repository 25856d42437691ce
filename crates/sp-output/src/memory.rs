//! In-memory sink for tests and dry runs.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::writer::ResponseSink;
use crate::{OutputResult, RecordLayout, ResponseRecord};

/// Keeps appended rows in a `Vec`, in append order.
pub struct MemorySink {
    layout:  RecordLayout,
    records: Mutex<Vec<ResponseRecord>>,
}

impl MemorySink {
    pub fn new(layout: RecordLayout) -> Self {
        Self { layout, records: Mutex::new(Vec::new()) }
    }

    fn rows(&self) -> MutexGuard<'_, Vec<ResponseRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of everything appended so far.
    pub fn records(&self) -> Vec<ResponseRecord> {
        self.rows().clone()
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }
}

impl ResponseSink for MemorySink {
    fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    fn init(&self) -> OutputResult<()> {
        Ok(())
    }

    fn append_batch(&self, records: &[ResponseRecord]) -> OutputResult<()> {
        self.rows().extend_from_slice(records);
        Ok(())
    }
}
