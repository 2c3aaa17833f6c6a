/// Query history lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    #[error("no query at step {step}: history holds {len} queries")]
    NotFound { step: u64, len: usize },
}
