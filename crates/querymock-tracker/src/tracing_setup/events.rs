//! Named tracing events emitted by the tracker.

use querymock_core::constants::QUERY_EVENT;
use querymock_core::CallInfo;
use uuid::Uuid;

pub fn session_installed(session: Uuid) {
    tracing::info!(event = "session_installed", %session, "query tracking installed");
}

pub fn session_uninstalled(session: Uuid, queries: usize) {
    tracing::info!(
        event = "session_uninstalled",
        %session,
        queries,
        "query tracking uninstalled"
    );
}

/// `install()` was called on a session that was still tracking.
pub fn session_reset_while_tracking(previous: Uuid, discarded: usize) {
    tracing::warn!(
        event = "session_reset_while_tracking",
        %previous,
        discarded,
        "install() called while already tracking; discarding query history (missing uninstall()?)"
    );
}

pub fn query_captured(step: u64, call: &CallInfo, log_bindings: bool) {
    if log_bindings {
        tracing::debug!(
            event = QUERY_EVENT,
            step,
            method = %call.method,
            sql = %call.sql,
            bindings = ?call.bindings,
            transacting = call.transacting,
            stream = call.stream,
            "query captured"
        );
    } else {
        tracing::debug!(
            event = QUERY_EVENT,
            step,
            method = %call.method,
            sql = %call.sql,
            transacting = call.transacting,
            stream = call.stream,
            "query captured"
        );
    }
}

pub fn query_settled(step: u64, delivered: bool) {
    tracing::trace!(event = "query_settled", step, delivered, "query answered");
}

/// `answered`: the query already had a response, so the error is not delivered.
pub fn listener_failed(step: u64, error: &anyhow::Error, answered: bool) {
    tracing::debug!(
        event = "listener_failed",
        step,
        answered,
        error = %error,
        "query listener failed"
    );
}

/// A record went away without `response` or `reject` ever being called.
pub fn record_dropped_unsettled(step: u64, sql: &str) {
    tracing::warn!(
        event = "record_dropped_unsettled",
        step,
        sql,
        "query dropped without a response"
    );
}
