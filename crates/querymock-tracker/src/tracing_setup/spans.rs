//! Span definitions for tracker operations.

/// Create a capture span around listener dispatch for one query.
#[macro_export]
macro_rules! capture_span {
    ($session:expr, $step:expr, $method:expr) => {
        tracing::debug_span!(
            "querymock.capture",
            session = %$session,
            step = $step,
            method = %$method
        )
    };
}

