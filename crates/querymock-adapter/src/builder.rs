//! Minimal query builder. Renders sqlite-dialect SQL with double-quoted
//! identifiers and sends every execution through the connection's hook.

use querymock_core::{AdapterError, CallInfo, QueryMethod};
use serde_json::{Map, Value};

use crate::connection::Connection;
use crate::shape::ResponseShape;
use crate::stream::RowStream;

#[derive(Debug, Clone, PartialEq)]
enum Statement {
    Select(Vec<String>),
    First(Vec<String>),
    Pluck(String),
    Count,
    Insert(Value),
    Update(Value),
    Del,
    Truncate,
}

/// A query against one table. Nothing runs until [`execute`](Self::execute)
/// or [`stream`](Self::stream).
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    conn: Connection,
    table: String,
    statement: Statement,
    wheres: Vec<(String, Value)>,
    transacting: bool,
}

impl QueryBuilder {
    pub(crate) fn new(conn: Connection, table: String, transacting: bool) -> Self {
        Self {
            conn,
            table,
            statement: Statement::Select(Vec::new()),
            wheres: Vec::new(),
            transacting,
        }
    }

    /// Select the given columns; an empty list selects `*`.
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.statement = Statement::Select(owned(columns));
        self
    }

    /// Select the first matching row.
    pub fn first(mut self, columns: &[&str]) -> Self {
        self.statement = Statement::First(owned(columns));
        self
    }

    /// Select a single column as a flat list.
    pub fn pluck(mut self, column: &str) -> Self {
        self.statement = Statement::Pluck(column.to_string());
        self
    }

    pub fn count(mut self) -> Self {
        self.statement = Statement::Count;
        self
    }

    /// Insert one row given as a JSON object.
    pub fn insert(mut self, row: Value) -> Self {
        self.statement = Statement::Insert(row);
        self
    }

    /// Update matching rows with the columns of a JSON object.
    pub fn update(mut self, values: Value) -> Self {
        self.statement = Statement::Update(values);
        self
    }

    pub fn del(mut self) -> Self {
        self.statement = Statement::Del;
        self
    }

    pub fn truncate(mut self) -> Self {
        self.statement = Statement::Truncate;
        self
    }

    /// Add an equality condition. Conditions are joined with `and`.
    pub fn where_eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.wheres.push((column.to_string(), value.into()));
        self
    }

    /// Render the call this builder would issue.
    pub fn to_call(&self) -> Result<CallInfo, AdapterError> {
        let table = quote(&self.table);
        let mut bindings = Vec::new();
        let (sql, method) = match &self.statement {
            Statement::Select(columns) => (
                format!("select {} from {table}{}", column_list(columns), self.where_clause(&mut bindings)),
                QueryMethod::Select,
            ),
            Statement::First(columns) => {
                let where_clause = self.where_clause(&mut bindings);
                bindings.push(Value::from(1));
                (
                    format!("select {} from {table}{where_clause} limit ?", column_list(columns)),
                    QueryMethod::First,
                )
            }
            Statement::Pluck(column) => (
                format!("select {} from {table}{}", quote(column), self.where_clause(&mut bindings)),
                QueryMethod::Pluck,
            ),
            Statement::Count => (
                format!("select count(*) from {table}{}", self.where_clause(&mut bindings)),
                QueryMethod::Select,
            ),
            Statement::Insert(row) => {
                let row = as_object(row, "insert")?;
                let columns: Vec<String> = row.keys().map(|c| quote(c)).collect();
                let placeholders = vec!["?"; row.len()].join(", ");
                bindings.extend(row.values().cloned());
                (
                    format!(
                        "insert into {table} ({}) values ({placeholders})",
                        columns.join(", ")
                    ),
                    QueryMethod::Insert,
                )
            }
            Statement::Update(values) => {
                let values = as_object(values, "update")?;
                let sets: Vec<String> = values.keys().map(|c| format!("{} = ?", quote(c))).collect();
                bindings.extend(values.values().cloned());
                (
                    format!(
                        "update {table} set {}{}",
                        sets.join(", "),
                        self.where_clause(&mut bindings)
                    ),
                    QueryMethod::Update,
                )
            }
            Statement::Del => (
                format!("delete from {table}{}", self.where_clause(&mut bindings)),
                QueryMethod::Del,
            ),
            Statement::Truncate => (format!("delete from {table}"), QueryMethod::Truncate),
        };

        Ok(CallInfo::new(sql, method)
            .with_bindings(bindings)
            .transacting(self.transacting))
    }

    fn shape(&self) -> ResponseShape {
        match &self.statement {
            Statement::First(_) => ResponseShape::First,
            Statement::Pluck(column) => ResponseShape::Pluck(column.clone()),
            _ => ResponseShape::AsIs,
        }
    }

    fn where_clause(&self, bindings: &mut Vec<Value>) -> String {
        if self.wheres.is_empty() {
            return String::new();
        }
        let conditions: Vec<String> = self
            .wheres
            .iter()
            .map(|(column, value)| {
                bindings.push(value.clone());
                format!("{} = ?", quote(column))
            })
            .collect();
        format!(" where {}", conditions.join(" and "))
    }

    /// Run the query and return the processed result.
    pub async fn execute(self) -> Result<Value, AdapterError> {
        let call = self.to_call()?;
        let output = self.conn.run(call).await?;
        Ok(self.shape().process(output.data))
    }

    /// Run the query as a row stream.
    pub fn stream(self) -> RowStream {
        let shape = self.shape();
        match self.to_call() {
            Ok(call) => RowStream::new(self.conn, call.streaming(true), shape),
            Err(error) => RowStream::failed(error),
        }
    }
}

/// A raw statement with explicit bindings.
#[derive(Debug, Clone)]
pub struct RawQuery {
    conn: Connection,
    call: CallInfo,
}

impl RawQuery {
    pub(crate) fn new(conn: Connection, sql: String, bindings: Vec<Value>, transacting: bool) -> Self {
        Self {
            conn,
            call: CallInfo::new(sql, QueryMethod::Raw)
                .with_bindings(bindings)
                .transacting(transacting),
        }
    }

    pub fn to_call(&self) -> CallInfo {
        self.call.clone()
    }

    pub async fn execute(self) -> Result<Value, AdapterError> {
        let output = self.conn.run(self.call).await?;
        Ok(output.data)
    }

    pub fn stream(self) -> RowStream {
        RowStream::new(self.conn, self.call.streaming(true), ResponseShape::AsIs)
    }
}

fn owned(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn column_list(columns: &[String]) -> String {
    if columns.is_empty() {
        "*".to_string()
    } else {
        columns.iter().map(|c| quote(c)).collect::<Vec<_>>().join(", ")
    }
}

fn as_object<'a>(value: &'a Value, method: &str) -> Result<&'a Map<String, Value>, AdapterError> {
    match value.as_object() {
        Some(object) if !object.is_empty() => Ok(object),
        _ => Err(AdapterError::InvalidInput {
            reason: format!("{method} expects a non-empty JSON object, got {value}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conn() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    #[test]
    fn renders_select_with_columns() {
        let call = conn().table("table").select(&["field"]).to_call().unwrap();
        assert_eq!(call.sql, r#"select "field" from "table""#);
        assert_eq!(call.method, QueryMethod::Select);
        assert!(call.bindings.is_empty());
        assert!(!call.transacting);
    }

    #[test]
    fn renders_count_as_select() {
        let call = conn().table("table").count().to_call().unwrap();
        assert_eq!(call.sql, r#"select count(*) from "table""#);
        assert_eq!(call.method, QueryMethod::Select);
    }

    #[test]
    fn renders_first_with_limit_binding() {
        let call = conn()
            .table("table")
            .first(&["fielda", "fieldb"])
            .where_eq("id", 2)
            .to_call()
            .unwrap();
        assert_eq!(
            call.sql,
            r#"select "fielda", "fieldb" from "table" where "id" = ? limit ?"#
        );
        assert_eq!(call.bindings, vec![json!(2), json!(1)]);
        assert_eq!(call.method, QueryMethod::First);
    }

    #[test]
    fn renders_insert_update_and_delete() {
        let insert = conn()
            .table("books")
            .insert(json!({ "title": "Hamlet" }))
            .to_call()
            .unwrap();
        assert_eq!(insert.sql, r#"insert into "books" ("title") values (?)"#);
        assert_eq!(insert.bindings, vec![json!("Hamlet")]);

        let update = conn()
            .table("models")
            .update(json!({ "foo": "bar" }))
            .where_eq("id", 10)
            .to_call()
            .unwrap();
        assert_eq!(update.sql, r#"update "models" set "foo" = ? where "id" = ?"#);
        assert_eq!(update.bindings, vec![json!("bar"), json!(10)]);
        assert_eq!(update.method, QueryMethod::Update);

        let del = conn().table("table").del().to_call().unwrap();
        assert_eq!(del.sql, r#"delete from "table""#);
        assert_eq!(del.method, QueryMethod::Del);

        let truncate = conn().table("table").truncate().to_call().unwrap();
        assert_eq!(truncate.method, QueryMethod::Truncate);
    }

    #[test]
    fn insert_requires_an_object() {
        let err = conn().table("books").insert(json!([1, 2])).to_call().unwrap_err();
        assert!(matches!(err, AdapterError::InvalidInput { .. }));
    }

    #[test]
    fn identifiers_are_escaped() {
        assert_eq!(quote(r#"we"ird"#), r#""we""ird""#);
    }

    #[tokio::test]
    async fn executes_against_sqlite() {
        let db = conn();
        db.raw("create table books (id integer primary key, title text)", vec![])
            .execute()
            .await
            .unwrap();
        let ids = db
            .table("books")
            .insert(json!({ "title": "Hamlet" }))
            .execute()
            .await
            .unwrap();
        assert_eq!(ids, json!([1]));

        let titles = db.table("books").pluck("title").execute().await.unwrap();
        assert_eq!(titles, json!(["Hamlet"]));

        let first = db.table("books").first(&["title"]).execute().await.unwrap();
        assert_eq!(first, json!({ "title": "Hamlet" }));

        assert!(db.has_table("books").await.unwrap());
        assert!(!db.has_table("missing").await.unwrap());
    }
}
