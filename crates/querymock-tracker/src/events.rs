//! Listener registry for the `query` event.
//!
//! Listeners run in registration order. A `once` listener is deregistered at
//! the moment it is invoked, before any later listener for the same event.

use std::fmt;
use std::sync::Arc;

use crate::record::QueryRecord;

/// A `query` listener. Receives the record and its step.
pub type Listener = Arc<dyn Fn(&QueryRecord, u64) -> anyhow::Result<()> + Send + Sync>;

/// Handle returned by registration, used to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Clone)]
pub(crate) struct Registration {
    pub(crate) id: ListenerId,
    pub(crate) once: bool,
    pub(crate) listener: Listener,
}

/// Ordered listener registry.
#[derive(Default)]
pub struct EventChannel {
    next_id: u64,
    registrations: Vec<Registration>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, listener: Listener) -> ListenerId {
        self.register(listener, false)
    }

    pub fn once(&mut self, listener: Listener) -> ListenerId {
        self.register(listener, true)
    }

    /// Remove a listener. Returns false when it was not registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.id != id);
        self.registrations.len() != before
    }

    pub fn clear(&mut self) {
        self.registrations.clear();
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Listeners to invoke for the next event, in registration order.
    pub(crate) fn snapshot(&self) -> Vec<Registration> {
        self.registrations.clone()
    }

    fn register(&mut self, listener: Listener, once: bool) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.registrations.push(Registration { id, once, listener });
        id
    }
}

impl fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("listeners", &self.registrations.len())
            .finish()
    }
}
