/// Configuration loading errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid querymock config: {reason}")]
    Parse { reason: String },
}
