//! Post-processing the builder applies to raw execution results.
//!
//! Runs on real and mocked data alike, so a canned response goes through the
//! same `first`/`pluck` handling the database result would.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ResponseShape {
    AsIs,
    /// First row of an array; anything else passes through.
    First,
    /// One column out of every row.
    Pluck(String),
    /// Whether any row came back.
    Exists,
}

impl ResponseShape {
    pub(crate) fn process(&self, data: Value) -> Value {
        match (self, data) {
            (ResponseShape::First, Value::Array(rows)) => {
                rows.into_iter().next().unwrap_or(Value::Null)
            }
            (ResponseShape::Pluck(column), Value::Array(rows)) => Value::Array(
                rows.into_iter().map(|row| pluck_row(column, row)).collect(),
            ),
            (ResponseShape::Exists, data) => Value::Bool(match data {
                Value::Array(rows) => !rows.is_empty(),
                Value::Bool(b) => b,
                Value::Null => false,
                _ => true,
            }),
            (_, data) => data,
        }
    }

    /// Shape applied to each element of a streamed result.
    pub(crate) fn process_row(&self, row: Value) -> Value {
        match self {
            ResponseShape::Pluck(column) => pluck_row(column, row),
            _ => row,
        }
    }
}

fn pluck_row(column: &str, row: Value) -> Value {
    match row {
        Value::Object(mut object) => object.remove(column).unwrap_or(Value::Null),
        other => other,
    }
}
