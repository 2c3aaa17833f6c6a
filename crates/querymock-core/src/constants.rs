/// The only event name the tracker publishes.
pub const QUERY_EVENT: &str = "query";

/// Separator between the rendered SQL and the rejection payload in caller-visible messages.
pub const REJECTION_SEPARATOR: &str = " - ";

/// Default: warn when `install()` discards a live session.
pub const DEFAULT_WARN_ON_REINSTALL: bool = true;

/// Default: keep bindings out of debug logs.
pub const DEFAULT_LOG_BINDINGS: bool = false;
