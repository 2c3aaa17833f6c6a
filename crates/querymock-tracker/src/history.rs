//! Append-only log of the records captured in one install session.

use querymock_core::HistoryError;

use crate::record::QueryRecord;

/// Ordered query history with 1-based step lookup.
#[derive(Debug, Clone, Default)]
pub struct QueryHistory {
    records: Vec<QueryRecord>,
}

impl QueryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: QueryRecord) {
        self.records.push(record);
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Result<QueryRecord, HistoryError> {
        self.step(1)
    }

    pub fn last(&self) -> Result<QueryRecord, HistoryError> {
        self.records
            .last()
            .cloned()
            .ok_or(HistoryError::NotFound { step: 0, len: 0 })
    }

    /// Record at 1-based position `step`.
    pub fn step(&self, step: u64) -> Result<QueryRecord, HistoryError> {
        usize::try_from(step)
            .ok()
            .and_then(|step| step.checked_sub(1))
            .and_then(|idx| self.records.get(idx))
            .cloned()
            .ok_or(HistoryError::NotFound {
                step,
                len: self.records.len(),
            })
    }

    /// All records in capture order.
    pub fn all(&self) -> Vec<QueryRecord> {
        self.records.clone()
    }
}
