//! The real execution hook: runs calls against a rusqlite connection.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use querymock_core::{AdapterError, CallInfo, QueryMethod};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::Connection;
use serde_json::{Map, Number, Value};

use crate::hook::{HookFuture, HookOutput, QueryHook};

pub(crate) fn to_adapter_err(message: impl Into<String>) -> AdapterError {
    AdapterError::Sqlite {
        message: message.into(),
    }
}

/// Executes calls on a single SQLite connection.
#[derive(Clone)]
pub struct SqliteHook {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteHook {
    pub fn open(path: &Path) -> Result<Self, AdapterError> {
        let conn = Connection::open(path).map_err(|e| to_adapter_err(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, AdapterError> {
        let conn = Connection::open_in_memory().map_err(|e| to_adapter_err(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn run(&self, call: &CallInfo) -> Result<Value, AdapterError> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stmt = conn
            .prepare(&call.sql)
            .map_err(|e| to_adapter_err(e.to_string()))?;
        let params: Vec<SqlValue> = call.bindings.iter().map(to_sql_value).collect();

        if stmt.column_count() > 0 {
            let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
            let mut rows = stmt
                .query(rusqlite::params_from_iter(params))
                .map_err(|e| to_adapter_err(e.to_string()))?;
            let mut out = Vec::new();
            while let Some(row) = rows.next().map_err(|e| to_adapter_err(e.to_string()))? {
                let mut object = Map::with_capacity(columns.len());
                for (idx, name) in columns.iter().enumerate() {
                    let value = row.get_ref(idx).map_err(|e| to_adapter_err(e.to_string()))?;
                    object.insert(name.clone(), from_sql_value(value));
                }
                out.push(Value::Object(object));
            }
            return Ok(Value::Array(out));
        }

        let changes = stmt
            .execute(rusqlite::params_from_iter(params))
            .map_err(|e| to_adapter_err(e.to_string()))?;
        Ok(match call.method {
            QueryMethod::Insert => Value::Array(vec![Value::from(conn.last_insert_rowid())]),
            QueryMethod::Update | QueryMethod::Del => Value::from(changes),
            _ => Value::Array(Vec::new()),
        })
    }
}

impl QueryHook for SqliteHook {
    fn execute(&self, call: CallInfo) -> HookFuture {
        let hook = self.clone();
        Box::pin(async move {
            let data = hook.run(&call)?;
            Ok::<_, AdapterError>(HookOutput {
                data,
                stream: call.stream,
            })
        })
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn from_sql_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn select_returns_rows_as_objects() {
        let hook = SqliteHook::open_in_memory().unwrap();
        let call = CallInfo::new("select sqlite_version() as version", QueryMethod::Raw);
        let output = hook.execute(call).await.unwrap();

        let rows = output.data.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0]["version"].is_string());
        assert!(!output.stream);
    }

    #[tokio::test]
    async fn insert_reports_rowid_and_update_reports_changes() {
        let hook = SqliteHook::open_in_memory().unwrap();
        hook.execute(CallInfo::new(
            "create table books (id integer primary key, title text)",
            QueryMethod::Raw,
        ))
        .await
        .unwrap();

        let insert = CallInfo::new(r#"insert into "books" ("title") values (?)"#, QueryMethod::Insert)
            .with_bindings(vec![json!("Hamlet")]);
        assert_eq!(hook.execute(insert).await.unwrap().data, json!([1]));

        let update = CallInfo::new(r#"update "books" set "title" = ?"#, QueryMethod::Update)
            .with_bindings(vec![json!("Moby Dick")]);
        assert_eq!(hook.execute(update).await.unwrap().data, json!(1));
    }

    #[tokio::test]
    async fn bad_sql_is_an_sqlite_error() {
        let hook = SqliteHook::open_in_memory().unwrap();
        let err = hook
            .execute(CallInfo::new("selec nothing", QueryMethod::Raw))
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Sqlite { .. }));
    }

    #[test]
    fn json_values_map_to_sqlite_values() {
        assert_eq!(to_sql_value(&json!(true)), SqlValue::Integer(1));
        assert_eq!(to_sql_value(&json!(2.5)), SqlValue::Real(2.5));
        assert_eq!(to_sql_value(&json!({"a": 1})), SqlValue::Text(r#"{"a":1}"#.into()));
    }
}
