//! Shared test helpers for the querymock workspace: canned JSON responses,
//! a tracing subscriber for tests, and a listener that records what it saw.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, Once};

use querymock_core::QueryMethod;
use querymock_tracker::{ListenerId, QueryRecord, Tracker};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Root directory of the fixture files.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Load a fixture file as raw JSON Value.
pub fn load_fixture_value(relative_path: &str) -> Value {
    load_fixture(relative_path)
}

/// Install a test subscriber once per process. Honors `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// What a listener observed for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct SeenQuery {
    pub step: u64,
    pub sql: String,
    pub method: QueryMethod,
    pub bindings: Vec<Value>,
    pub transacting: bool,
}

impl SeenQuery {
    fn from_record(record: &QueryRecord, step: u64) -> Self {
        Self {
            step,
            sql: record.sql().to_string(),
            method: record.method().clone(),
            bindings: record.bindings().to_vec(),
            transacting: record.transacting(),
        }
    }
}

/// Listener that records every query it is handed, optionally answering it.
#[derive(Debug, Clone, Default)]
pub struct QueryRecorder {
    seen: Arc<Mutex<Vec<SeenQuery>>>,
}

impl QueryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register on `tracker`; answers nothing.
    pub fn attach(&self, tracker: &Tracker) -> ListenerId {
        let seen = Arc::clone(&self.seen);
        tracker.on(move |record, step| {
            seen.lock().unwrap().push(SeenQuery::from_record(record, step));
            Ok(())
        })
    }

    /// Register on `tracker` and answer every query with `data`.
    pub fn attach_responding(&self, tracker: &Tracker, data: Value) -> ListenerId {
        let seen = Arc::clone(&self.seen);
        tracker.on(move |record, step| {
            seen.lock().unwrap().push(SeenQuery::from_record(record, step));
            record.response(data.clone())?;
            Ok(())
        })
    }

    pub fn seen(&self) -> Vec<SeenQuery> {
        self.seen.lock().unwrap().clone()
    }

    pub fn steps(&self) -> Vec<u64> {
        self.seen().iter().map(|q| q.step).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_load() {
        let rows = load_fixture_value("responses/fielded_rows.json");
        assert_eq!(rows.as_array().map(Vec::len), Some(3));
        assert_eq!(rows[1]["fielda"], "C");

        let books = load_fixture_value("transactions/books.json");
        assert_eq!(books["books"].as_array().map(Vec::len), Some(3));
    }
}
