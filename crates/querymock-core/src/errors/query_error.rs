use std::error::Error as StdError;

/// Failures delivered to the original data-access caller of an intercepted query.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Test code rejected the query. The message always leads with the rendered SQL.
    #[error("{sql}{}{message}", crate::constants::REJECTION_SEPARATOR)]
    Rejected {
        sql: String,
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    },

    /// A `query` listener failed while the call was being dispatched.
    #[error("{source}")]
    Listener {
        step: u64,
        #[source]
        source: anyhow::Error,
    },

    /// The record was dropped without ever being answered.
    #[error("query at step {step} was dropped without a response")]
    Abandoned { step: u64 },
}

impl QueryError {
    /// Step of the query that failed, when known.
    pub fn step(&self) -> Option<u64> {
        match self {
            QueryError::Rejected { .. } => None,
            QueryError::Listener { step, .. } | QueryError::Abandoned { step } => Some(*step),
        }
    }
}
