//! RowStream: element-by-element delivery of a query result.
//!
//! The call is issued on the first [`RowStream::next`]. Any failure, including
//! a listener error raised while the call was being captured, arrives as an
//! `Err` item on the stream.

use std::collections::VecDeque;

use querymock_core::{AdapterError, CallInfo};
use serde_json::Value;

use crate::connection::Connection;
use crate::hook::HookOutput;
use crate::shape::ResponseShape;

enum StreamState {
    Idle {
        conn: Connection,
        call: CallInfo,
        shape: ResponseShape,
    },
    Failed(AdapterError),
    Rows(VecDeque<Value>),
    Done,
}

/// A stream of result rows.
pub struct RowStream {
    state: StreamState,
}

impl RowStream {
    pub(crate) fn new(conn: Connection, call: CallInfo, shape: ResponseShape) -> Self {
        Self {
            state: StreamState::Idle { conn, call, shape },
        }
    }

    pub(crate) fn failed(error: AdapterError) -> Self {
        Self {
            state: StreamState::Failed(error),
        }
    }

    /// Next row, `Some(Err(_))` once on failure, then `None`.
    pub async fn next(&mut self) -> Option<Result<Value, AdapterError>> {
        loop {
            match std::mem::replace(&mut self.state, StreamState::Done) {
                StreamState::Idle { conn, call, shape } => match conn.run(call).await {
                    Ok(output) => self.state = StreamState::Rows(rows(output, &shape)),
                    Err(error) => return Some(Err(error)),
                },
                StreamState::Failed(error) => return Some(Err(error)),
                StreamState::Rows(mut rows) => {
                    let row = rows.pop_front()?;
                    self.state = StreamState::Rows(rows);
                    return Some(Ok(row));
                }
                StreamState::Done => return None,
            }
        }
    }

    /// Drain the stream. Stops at the first error.
    pub async fn collect(mut self) -> Result<Vec<Value>, AdapterError> {
        let mut out = Vec::new();
        while let Some(row) = self.next().await {
            out.push(row?);
        }
        Ok(out)
    }
}

impl std::fmt::Debug for RowStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            StreamState::Idle { .. } => "idle",
            StreamState::Failed(_) => "failed",
            StreamState::Rows(_) => "rows",
            StreamState::Done => "done",
        };
        f.debug_struct("RowStream").field("state", &state).finish()
    }
}

/// A streaming output yields each array element; anything else is one item.
fn rows(output: HookOutput, shape: &ResponseShape) -> VecDeque<Value> {
    let items = match output.data {
        Value::Array(items) if output.stream => items,
        data => vec![data],
    };
    items.into_iter().map(|row| shape.process_row(row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn streaming_output_is_split_into_rows() {
        let output = HookOutput {
            data: json!([{ "a": 1 }, { "a": 2 }]),
            stream: true,
        };
        let rows = rows(output, &ResponseShape::AsIs);
        assert_eq!(rows, VecDeque::from(vec![json!({ "a": 1 }), json!({ "a": 2 })]));
    }

    #[test]
    fn plain_output_is_a_single_item() {
        let output = HookOutput::value(json!([{ "a": 1 }, { "a": 2 }]));
        let rows = rows(output, &ResponseShape::AsIs);
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn real_rows_stream_in_order() {
        let db = Connection::open_in_memory().unwrap();
        db.raw("create table t (n integer)", vec![]).execute().await.unwrap();
        for n in 1..=3 {
            db.table("t").insert(json!({ "n": n })).execute().await.unwrap();
        }

        let mut stream = db.table("t").pluck("n").stream();
        assert_eq!(stream.next().await.unwrap().unwrap(), json!(1));
        assert_eq!(stream.collect().await.unwrap(), vec![json!(2), json!(3)]);
    }

    #[tokio::test]
    async fn invalid_builder_input_fails_the_stream() {
        let db = Connection::open_in_memory().unwrap();
        let mut stream = db.table("t").insert(json!(null)).stream();
        assert!(matches!(
            stream.next().await,
            Some(Err(AdapterError::InvalidInput { .. }))
        ));
        assert!(stream.next().await.is_none());
    }
}
