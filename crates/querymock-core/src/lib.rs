//! # querymock-core
//!
//! Foundation crate for querymock.
//! Defines the call description handed from adapters to the tracker,
//! the error taxonomy, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod call;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export the most commonly used types at the crate root.
pub use call::{CallInfo, QueryMethod};
pub use config::{MockConfig, UnsettledPolicy};
pub use errors::{
    AdapterError, ConfigError, HistoryError, MockError, MockResult, QueryError, SettlementError,
};
