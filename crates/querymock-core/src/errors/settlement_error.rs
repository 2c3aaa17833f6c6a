/// Errors raised to whoever tries to answer a query record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettlementError {
    #[error("query at step {step} was already answered")]
    DoubleSettlement { step: u64 },
}
