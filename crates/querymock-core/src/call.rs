//! CallInfo: what an adapter knows about one execution before it runs.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Logical operation kind of an intercepted call.
///
/// Serialized as the lowercase name the builder uses (`"del"`, `"pluck"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QueryMethod {
    Select,
    First,
    Pluck,
    Insert,
    Update,
    Del,
    Truncate,
    Raw,
    ColumnInfo,
    Other(String),
}

impl QueryMethod {
    pub fn as_str(&self) -> &str {
        match self {
            QueryMethod::Select => "select",
            QueryMethod::First => "first",
            QueryMethod::Pluck => "pluck",
            QueryMethod::Insert => "insert",
            QueryMethod::Update => "update",
            QueryMethod::Del => "del",
            QueryMethod::Truncate => "truncate",
            QueryMethod::Raw => "raw",
            QueryMethod::ColumnInfo => "columnInfo",
            QueryMethod::Other(name) => name,
        }
    }
}

impl fmt::Display for QueryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for QueryMethod {
    fn from(name: &str) -> Self {
        match name {
            "select" => QueryMethod::Select,
            "first" => QueryMethod::First,
            "pluck" => QueryMethod::Pluck,
            "insert" => QueryMethod::Insert,
            "update" => QueryMethod::Update,
            "del" | "delete" => QueryMethod::Del,
            "truncate" => QueryMethod::Truncate,
            "raw" => QueryMethod::Raw,
            "columnInfo" => QueryMethod::ColumnInfo,
            other => QueryMethod::Other(other.to_string()),
        }
    }
}

impl From<String> for QueryMethod {
    fn from(name: String) -> Self {
        QueryMethod::from(name.as_str())
    }
}

impl From<QueryMethod> for String {
    fn from(method: QueryMethod) -> Self {
        method.as_str().to_string()
    }
}

/// Raw call information produced by an adapter for a single execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallInfo {
    /// Rendered statement text.
    pub sql: String,
    /// Bound parameter values, in placeholder order.
    pub bindings: Vec<Value>,
    pub method: QueryMethod,
    /// Issued inside an open transaction.
    pub transacting: bool,
    /// The caller consumes the result as a stream of rows.
    pub stream: bool,
}

impl CallInfo {
    pub fn new(sql: impl Into<String>, method: QueryMethod) -> Self {
        Self {
            sql: sql.into(),
            bindings: Vec::new(),
            method,
            transacting: false,
            stream: false,
        }
    }

    pub fn with_bindings(mut self, bindings: Vec<Value>) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn transacting(mut self, transacting: bool) -> Self {
        self.transacting = transacting;
        self
    }

    pub fn streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}
