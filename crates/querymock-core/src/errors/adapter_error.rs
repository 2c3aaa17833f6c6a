use super::QueryError;

/// Errors raised by adapters, shims, and the registration layer.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("connection is already mocked")]
    AlreadyMocked,

    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("invalid builder input: {reason}")]
    InvalidInput { reason: String },

    #[error("transaction already finished; cannot issue {statement}")]
    TransactionFinished { statement: String },

    #[error(transparent)]
    Query(#[from] QueryError),
}
