//! MockRegistry: binds one tracker to any number of connections.

use std::sync::Arc;

use querymock_core::{AdapterError, MockConfig};
use querymock_tracker::Tracker;

use crate::connection::Connection;

/// Registration layer: `mock`, `unmock`, and access to the tracker.
///
/// The tracker is an explicit object owned here, so independent registries
/// (and trackers) can coexist in one process.
#[derive(Debug, Clone)]
pub struct MockRegistry {
    tracker: Arc<Tracker>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::with_tracker(Arc::new(Tracker::new()))
    }

    pub fn with_config(config: MockConfig) -> Self {
        Self::with_tracker(Arc::new(Tracker::with_config(config)))
    }

    pub fn with_tracker(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }

    pub fn tracker(&self) -> Arc<Tracker> {
        Arc::clone(&self.tracker)
    }

    /// Route `conn`'s calls through this registry's tracker.
    ///
    /// Fails with [`AdapterError::AlreadyMocked`] if `conn` is already mocked.
    pub fn mock(&self, conn: &Connection) -> Result<(), AdapterError> {
        conn.install_shim(Arc::clone(&self.tracker))?;
        tracing::info!(event = "connection_mocked", "connection mocked");
        Ok(())
    }

    /// Restore `conn`'s original hook. Returns false, and does nothing, when
    /// `conn` is not mocked.
    pub fn unmock(&self, conn: &Connection) -> bool {
        match conn.remove_shim() {
            Some(tag) => {
                if !Arc::ptr_eq(&tag.tracker, &self.tracker) {
                    tracing::debug!(
                        event = "connection_unmocked_foreign",
                        "connection was mocked by another registry"
                    );
                }
                tracing::info!(event = "connection_unmocked", "connection unmocked");
                true
            }
            None => {
                tracing::debug!(event = "unmock_noop", "connection is not mocked");
                false
            }
        }
    }
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self::new()
    }
}
