mod adapter_error;
mod config_error;
mod history_error;
mod query_error;
mod settlement_error;

pub use adapter_error::AdapterError;
pub use config_error::ConfigError;
pub use history_error::HistoryError;
pub use query_error::QueryError;
pub use settlement_error::SettlementError;

/// Top-level error for querymock. Every subsystem error converts into this.
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Settlement(#[from] SettlementError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type MockResult<T> = Result<T, MockError>;
