//! QueryRecord: one intercepted call plus the only handle able to answer it.

use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use querymock_core::{CallInfo, QueryError, QueryMethod, SettlementError};
use serde_json::Value;

use crate::response::{QueryResponse, ResponseOptions, ResponseSender, Settlement};
use crate::tracing_setup::events;

/// Payload passed to [`QueryRecord::reject`].
#[derive(Debug)]
pub enum Rejection {
    /// Plain value; the caller sees `"<sql> - <value>"`.
    Message(String),
    /// An error object; kept as the source of the caller's error.
    Error(Box<dyn StdError + Send + Sync + 'static>),
}

impl Rejection {
    pub fn error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Rejection::Error(Box::new(error))
    }

    fn into_query_error(self, sql: &str) -> QueryError {
        match self {
            Rejection::Message(message) => QueryError::Rejected {
                sql: sql.to_string(),
                message,
                source: None,
            },
            Rejection::Error(error) => QueryError::Rejected {
                sql: sql.to_string(),
                message: error.to_string(),
                source: Some(error),
            },
        }
    }
}

impl From<&str> for Rejection {
    fn from(message: &str) -> Self {
        Rejection::Message(message.to_string())
    }
}

impl From<String> for Rejection {
    fn from(message: String) -> Self {
        Rejection::Message(message)
    }
}

impl From<Value> for Rejection {
    fn from(value: Value) -> Self {
        match value {
            Value::String(message) => Rejection::Message(message),
            other => Rejection::Message(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for Rejection {
    fn from(error: anyhow::Error) -> Self {
        Rejection::Error(error.into())
    }
}

struct RecordInner {
    call: CallInfo,
    step: u64,
    captured_at: DateTime<Utc>,
    sender: Mutex<Option<ResponseSender>>,
}

impl Drop for RecordInner {
    fn drop(&mut self) {
        let unanswered = self
            .sender
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        if unanswered {
            events::record_dropped_unsettled(self.step, &self.call.sql);
        }
    }
}

/// An intercepted query as seen by test code.
///
/// Cloning is cheap; all clones answer the same call. Exactly one of
/// [`response`](Self::response) or [`reject`](Self::reject) must be called for
/// the original caller to complete.
#[derive(Clone)]
pub struct QueryRecord {
    inner: Arc<RecordInner>,
}

impl QueryRecord {
    pub(crate) fn new(call: CallInfo, step: u64, sender: ResponseSender) -> Self {
        Self {
            inner: Arc::new(RecordInner {
                call,
                step,
                captured_at: Utc::now(),
                sender: Mutex::new(Some(sender)),
            }),
        }
    }

    pub fn sql(&self) -> &str {
        &self.inner.call.sql
    }

    pub fn bindings(&self) -> &[Value] {
        &self.inner.call.bindings
    }

    pub fn method(&self) -> &QueryMethod {
        &self.inner.call.method
    }

    pub fn transacting(&self) -> bool {
        self.inner.call.transacting
    }

    /// Whether the caller consumes this query as a stream.
    pub fn is_stream(&self) -> bool {
        self.inner.call.stream
    }

    /// 1-based position in the session's history.
    pub fn step(&self) -> u64 {
        self.inner.step
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.inner.captured_at
    }

    /// The call exactly as the adapter described it.
    pub fn call(&self) -> &CallInfo {
        &self.inner.call
    }

    pub fn is_settled(&self) -> bool {
        self.inner
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Answer the query with `data`.
    pub fn response(&self, data: impl Into<Value>) -> Result<(), SettlementError> {
        self.response_with(data, ResponseOptions::default())
    }

    /// Answer the query with `data`, delivered according to `options`.
    pub fn response_with(
        &self,
        data: impl Into<Value>,
        options: ResponseOptions,
    ) -> Result<(), SettlementError> {
        self.settle(Settlement::Resolved(QueryResponse {
            data: data.into(),
            stream: options.stream,
        }))
    }

    /// Fail the query. The caller's error message is `"<sql> - <error>"`.
    pub fn reject(&self, error: impl Into<Rejection>) -> Result<(), SettlementError> {
        let error = error.into().into_query_error(self.sql());
        self.settle(Settlement::Rejected(error))
    }

    /// Two handles are the same record when they share the channel.
    pub fn same_record(&self, other: &QueryRecord) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn settle(&self, settlement: Settlement) -> Result<(), SettlementError> {
        let sender = self
            .inner
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(SettlementError::DoubleSettlement { step: self.step() })?;

        let delivered = sender.send(settlement);
        events::query_settled(self.step(), delivered);
        Ok(())
    }
}

impl fmt::Debug for QueryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryRecord")
            .field("step", &self.step())
            .field("method", self.method())
            .field("sql", &self.sql())
            .field("bindings", &self.bindings())
            .field("transacting", &self.transacting())
            .field("stream", &self.is_stream())
            .field("settled", &self.is_settled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response;
    use querymock_core::UnsettledPolicy;
    use serde_json::json;

    fn record(sql: &str) -> (QueryRecord, response::PendingResponse) {
        let (sender, pending) = response::channel(1, UnsettledPolicy::Fail);
        let call = CallInfo::new(sql, QueryMethod::Select);
        (QueryRecord::new(call, 1, sender), pending)
    }

    #[tokio::test]
    async fn response_resolves_pending_caller() {
        let (record, pending) = record("select 1");
        record.response(json!({ "works": true })).unwrap();

        let response = pending.await.unwrap();
        assert_eq!(response.data, json!({ "works": true }));
        assert!(!response.stream);
        assert!(record.is_settled());
    }

    #[tokio::test]
    async fn string_rejection_is_prefixed_with_sql() {
        let (record, pending) = record(r#"select "field" from "table""#);
        record.reject("i threw up").unwrap();

        let err = pending.await.unwrap_err();
        assert_eq!(err.to_string(), r#"select "field" from "table" - i threw up"#);
        assert!(std::error::Error::source(&err).is_none());
    }

    #[tokio::test]
    async fn error_rejection_keeps_source() {
        let (record, pending) = record("select 1");
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        record.reject(Rejection::error(io)).unwrap();

        let err = pending.await.unwrap_err();
        assert_eq!(err.to_string(), "select 1 - disk on fire");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn json_rejection_renders_json_text() {
        let (record, _pending) = record("select 1");
        let rejection = Rejection::from(json!({ "code": 7 }));
        match rejection.into_query_error(record.sql()) {
            QueryError::Rejected { message, .. } => assert_eq!(message, r#"{"code":7}"#),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn second_settlement_is_rejected_and_first_wins() {
        let (record, pending) = record("select 1");
        record.response(json!(["first"])).unwrap();

        assert_eq!(
            record.response(json!(["second"])),
            Err(SettlementError::DoubleSettlement { step: 1 })
        );
        assert_eq!(
            record.reject("late"),
            Err(SettlementError::DoubleSettlement { step: 1 })
        );
        assert_eq!(pending.await.unwrap().data, json!(["first"]));
    }

    #[tokio::test]
    async fn clones_share_the_channel() {
        let (record, pending) = record("select 1");
        let clone = record.clone();
        assert!(clone.same_record(&record));

        clone.response(1).unwrap();
        assert!(record.is_settled());
        assert!(record.response(2).is_err());
        assert_eq!(pending.await.unwrap().data, json!(1));
    }

    #[tokio::test]
    async fn dropped_record_fails_caller_under_fail_policy() {
        let (record, pending) = record("select 1");
        drop(record);

        let err = pending.await.unwrap_err();
        assert!(matches!(err, QueryError::Abandoned { step: 1 }));
    }
}
