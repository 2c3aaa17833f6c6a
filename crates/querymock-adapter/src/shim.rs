//! InterceptionShim: wraps a connection's original hook and routes every
//! call through the tracker first.

use std::sync::Arc;

use querymock_core::{AdapterError, CallInfo};
use querymock_tracker::{Capture, Tracker};

use crate::hook::{HookFuture, HookOutput, QueryHook};

/// Decorator over the hook that was installed before mocking.
pub struct InterceptionShim {
    original: Arc<dyn QueryHook>,
    tracker: Arc<Tracker>,
}

impl InterceptionShim {
    pub fn new(original: Arc<dyn QueryHook>, tracker: Arc<Tracker>) -> Self {
        Self { original, tracker }
    }

    /// The hook calls fall through to while the tracker is uninstalled.
    pub fn original(&self) -> &Arc<dyn QueryHook> {
        &self.original
    }

    pub fn tracker(&self) -> &Arc<Tracker> {
        &self.tracker
    }
}

impl QueryHook for InterceptionShim {
    fn execute(&self, call: CallInfo) -> HookFuture {
        match self.tracker.capture(call) {
            Ok(Capture::NotIntercepted(call)) => self.original.execute(call),
            Ok(Capture::Intercepted(pending)) => Box::pin(async move {
                let response = pending.await?;
                Ok::<_, AdapterError>(HookOutput {
                    data: response.data,
                    stream: response.stream,
                })
            }),
            Err(error) => Box::pin(async move { Err::<HookOutput, _>(AdapterError::from(error)) }),
        }
    }

    fn name(&self) -> &'static str {
        "interception-shim"
    }
}

/// Out-of-band marker stored on a mocked connection. Holds the exact hook
/// `unmock` puts back.
#[derive(Clone)]
pub(crate) struct MockTag {
    pub(crate) original: Arc<dyn QueryHook>,
    pub(crate) tracker: Arc<Tracker>,
}
