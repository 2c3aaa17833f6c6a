//! Tracker: owns the session's history and listeners, turns intercepted
//! calls into records and hands the caller a pending response.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use querymock_core::{CallInfo, HistoryError, MockConfig, MockResult, QueryError};
use serde_json::Value;
use uuid::Uuid;

use crate::events::{EventChannel, ListenerId, Registration};
use crate::history::QueryHistory;
use crate::record::{QueryRecord, Rejection};
use crate::response::{self, PendingResponse};
use crate::tracing_setup::events;

/// Result of handing a call to the tracker.
#[derive(Debug)]
pub enum Capture {
    /// Tracking is off. The call is handed back for the real hook.
    NotIntercepted(CallInfo),
    /// The call was recorded; the future completes when test code answers it.
    Intercepted(PendingResponse),
}

struct TrackerState {
    tracking: bool,
    session: Uuid,
    history: QueryHistory,
    events: EventChannel,
}

/// Query tracker. Share it as `Arc<Tracker>` between the registration layer,
/// the interception shim, and test code.
pub struct Tracker {
    config: MockConfig,
    state: Mutex<TrackerState>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            state: Mutex::new(TrackerState {
                tracking: false,
                session: Uuid::new_v4(),
                history: QueryHistory::new(),
                events: EventChannel::new(),
            }),
        }
    }

    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    fn state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a clean session: empty history, no listeners, tracking on.
    ///
    /// Calling this while already tracking also resets the session.
    pub fn install(&self) {
        let discarded = {
            let mut state = self.state();
            let previous = state.session;
            let was_tracking = state.tracking;
            // Records are dropped outside the lock: their Drop may log.
            let old = std::mem::take(&mut state.history);
            state.events.clear();
            state.tracking = true;
            state.session = Uuid::new_v4();
            events::session_installed(state.session);
            if was_tracking && self.config.warn_on_reinstall {
                events::session_reset_while_tracking(previous, old.count());
            }
            old
        };
        drop(discarded);
    }

    /// Stop intercepting. History stays readable; unanswered calls stay pending.
    pub fn uninstall(&self) {
        let mut state = self.state();
        state.tracking = false;
        events::session_uninstalled(state.session, state.history.count());
    }

    pub fn is_tracking(&self) -> bool {
        self.state().tracking
    }

    /// Id of the current install session.
    pub fn session_id(&self) -> Uuid {
        self.state().session
    }

    /// Register a listener for every captured query.
    pub fn on<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&QueryRecord, u64) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.state().events.on(Arc::new(listener))
    }

    /// Register a listener for the next captured query only.
    pub fn once<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&QueryRecord, u64) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.state().events.once(Arc::new(listener))
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.state().events.off(id)
    }

    pub fn off_all(&self) {
        self.state().events.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.state().events.len()
    }

    /// Read-only view of the current session's history.
    pub fn queries(&self) -> Queries<'_> {
        Queries { tracker: self }
    }

    /// Hand an intercepted call to the tracker.
    ///
    /// Listeners run synchronously, in registration order, before this
    /// returns. A listener error stops dispatch. It becomes the caller's
    /// failure only while the query is unanswered; once a listener has
    /// answered it, the caller gets that answer and the error is logged.
    pub fn capture(&self, call: CallInfo) -> Result<Capture, QueryError> {
        let (record, pending, listeners, session) = {
            let mut state = self.state();
            if !state.tracking {
                return Ok(Capture::NotIntercepted(call));
            }
            let step = state.history.count() as u64 + 1;
            events::query_captured(step, &call, self.config.log_bindings);

            let (sender, pending) = response::channel(step, self.config.unsettled);
            let record = QueryRecord::new(call, step, sender);
            state.history.push(record.clone());
            (record, pending, state.events.snapshot(), state.session)
        };

        let step = record.step();
        let _span = crate::capture_span!(session, step, record.method()).entered();
        if let Err(source) = self.emit(&record, listeners) {
            let answered = record.is_settled();
            events::listener_failed(step, &source, answered);
            if !answered {
                return Err(QueryError::Listener { step, source });
            }
        }

        Ok(Capture::Intercepted(pending))
    }

    fn emit(&self, record: &QueryRecord, listeners: Vec<Registration>) -> anyhow::Result<()> {
        for registration in listeners {
            // A once listener may already have fired from a nested capture.
            if registration.once && !self.state().events.off(registration.id) {
                continue;
            }
            (registration.listener)(record, record.step())?;
        }
        Ok(())
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("Tracker")
            .field("tracking", &state.tracking)
            .field("session", &state.session)
            .field("queries", &state.history.count())
            .field("listeners", &state.events.len())
            .finish()
    }
}

/// Borrowed view over the tracker's query history.
///
/// Every call reads the live session, so a view taken before `install()`
/// sees the new, empty history afterwards.
#[derive(Clone, Copy)]
pub struct Queries<'a> {
    tracker: &'a Tracker,
}

impl Queries<'_> {
    pub fn count(&self) -> usize {
        self.tracker.state().history.count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn first(&self) -> Result<QueryRecord, HistoryError> {
        self.tracker.state().history.first()
    }

    pub fn last(&self) -> Result<QueryRecord, HistoryError> {
        self.tracker.state().history.last()
    }

    pub fn step(&self, step: u64) -> Result<QueryRecord, HistoryError> {
        self.tracker.state().history.step(step)
    }

    /// Answer the query at `step`.
    pub fn respond(&self, step: u64, data: impl Into<Value>) -> MockResult<()> {
        self.step(step)?.response(data)?;
        Ok(())
    }

    /// Fail the query at `step`.
    pub fn reject(&self, step: u64, error: impl Into<Rejection>) -> MockResult<()> {
        self.step(step)?.reject(error)?;
        Ok(())
    }

    pub fn all(&self) -> Vec<QueryRecord> {
        self.tracker.state().history.all()
    }
}
