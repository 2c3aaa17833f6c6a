//! Connection: owns the execution hook slot that mocking swaps out.

use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use querymock_core::{AdapterError, CallInfo, QueryMethod};
use querymock_tracker::Tracker;
use serde_json::Value;

use crate::builder::{QueryBuilder, RawQuery};
use crate::hook::{HookOutput, QueryHook};
use crate::shim::{InterceptionShim, MockTag};
use crate::sqlite::SqliteHook;
use crate::transaction::Transaction;

struct HookSlot {
    hook: Arc<dyn QueryHook>,
    tag: Option<MockTag>,
}

/// A database handle. Clones share the same hook slot.
#[derive(Clone)]
pub struct Connection {
    slot: Arc<Mutex<HookSlot>>,
}

impl Connection {
    /// Open a SQLite database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AdapterError> {
        Ok(Self::with_hook(Arc::new(SqliteHook::open(path.as_ref())?)))
    }

    /// Open a private in-memory SQLite database.
    pub fn open_in_memory() -> Result<Self, AdapterError> {
        Ok(Self::with_hook(Arc::new(SqliteHook::open_in_memory()?)))
    }

    /// Build a connection over any hook.
    pub fn with_hook(hook: Arc<dyn QueryHook>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(HookSlot { hook, tag: None })),
        }
    }

    fn slot(&self) -> MutexGuard<'_, HookSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The hook calls currently go through.
    pub fn hook(&self) -> Arc<dyn QueryHook> {
        Arc::clone(&self.slot().hook)
    }

    pub fn is_mocked(&self) -> bool {
        self.slot().tag.is_some()
    }

    /// Tracker this connection is mocked with, if any.
    pub fn mock_tracker(&self) -> Option<Arc<Tracker>> {
        self.slot().tag.as_ref().map(|tag| Arc::clone(&tag.tracker))
    }

    /// Wrap the current hook in an interception shim and tag the connection.
    pub(crate) fn install_shim(&self, tracker: Arc<Tracker>) -> Result<(), AdapterError> {
        let mut slot = self.slot();
        if slot.tag.is_some() {
            return Err(AdapterError::AlreadyMocked);
        }
        let original = Arc::clone(&slot.hook);
        slot.hook = Arc::new(InterceptionShim::new(
            Arc::clone(&original),
            Arc::clone(&tracker),
        ));
        slot.tag = Some(MockTag { original, tracker });
        Ok(())
    }

    /// Put back the exact hook that was saved by `install_shim`.
    pub(crate) fn remove_shim(&self) -> Option<MockTag> {
        let mut slot = self.slot();
        let tag = slot.tag.take()?;
        slot.hook = Arc::clone(&tag.original);
        Some(tag)
    }

    pub(crate) async fn run(&self, call: CallInfo) -> Result<HookOutput, AdapterError> {
        let hook = self.hook();
        hook.execute(call).await
    }

    /// Start a query against `table`.
    pub fn table(&self, table: impl Into<String>) -> QueryBuilder {
        QueryBuilder::new(self.clone(), table.into(), false)
    }

    /// A raw statement, passed through as written.
    pub fn raw(&self, sql: impl Into<String>, bindings: Vec<Value>) -> RawQuery {
        RawQuery::new(self.clone(), sql.into(), bindings, false)
    }

    /// Whether a table named `name` exists.
    pub async fn has_table(&self, name: &str) -> Result<bool, AdapterError> {
        let call = CallInfo::new(
            "select * from sqlite_master where type = 'table' and name = ?",
            QueryMethod::Select,
        )
        .with_bindings(vec![Value::from(name)]);
        let output = self.run(call).await?;
        Ok(crate::shape::ResponseShape::Exists
            .process(output.data)
            .as_bool()
            .unwrap_or(false))
    }

    /// Open a transaction by issuing `BEGIN;`.
    pub async fn begin(&self) -> Result<Transaction, AdapterError> {
        Transaction::begin(self.clone()).await
    }

    /// Run `f` inside a transaction. Commits when `f` succeeds and rolls back
    /// when it fails, unless `f` already finished the transaction itself.
    pub async fn transaction<F, Fut, T>(&self, f: F) -> Result<T, AdapterError>
    where
        F: FnOnce(Transaction) -> Fut,
        Fut: Future<Output = Result<T, AdapterError>>,
    {
        let trx = self.begin().await?;
        match f(trx.clone()).await {
            Ok(value) => {
                if !trx.is_completed() {
                    trx.commit().await?;
                }
                Ok(value)
            }
            Err(error) => {
                if !trx.is_completed() {
                    if let Err(rollback_error) = trx.rollback().await {
                        tracing::warn!(
                            error = %rollback_error,
                            "rollback failed after transaction error"
                        );
                    }
                }
                Err(error)
            }
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.slot();
        f.debug_struct("Connection")
            .field("hook", &slot.hook.name())
            .field("mocked", &slot.tag.is_some())
            .finish()
    }
}
