//! Transactions: `BEGIN;`, statements flagged as transacting, then
//! `COMMIT;` or `ROLLBACK;`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use querymock_core::{AdapterError, CallInfo, QueryMethod};
use serde_json::Value;

use crate::builder::{QueryBuilder, RawQuery};
use crate::connection::Connection;

/// An open transaction. Clones refer to the same transaction.
#[derive(Debug, Clone)]
pub struct Transaction {
    conn: Connection,
    completed: Arc<AtomicBool>,
}

impl Transaction {
    pub(crate) async fn begin(conn: Connection) -> Result<Self, AdapterError> {
        conn.run(control("BEGIN;")).await?;
        Ok(Self {
            conn,
            completed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Start a query that runs inside this transaction.
    pub fn table(&self, table: impl Into<String>) -> QueryBuilder {
        QueryBuilder::new(self.conn.clone(), table.into(), true)
    }

    pub fn raw(&self, sql: impl Into<String>, bindings: Vec<Value>) -> RawQuery {
        RawQuery::new(self.conn.clone(), sql.into(), bindings, true)
    }

    pub async fn commit(&self) -> Result<(), AdapterError> {
        self.finish("COMMIT;").await
    }

    pub async fn rollback(&self) -> Result<(), AdapterError> {
        self.finish("ROLLBACK;").await
    }

    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }

    async fn finish(&self, sql: &str) -> Result<(), AdapterError> {
        if self.completed.swap(true, Ordering::SeqCst) {
            return Err(AdapterError::TransactionFinished {
                statement: sql.to_string(),
            });
        }
        self.conn.run(control(sql)).await?;
        Ok(())
    }
}

fn control(sql: &str) -> CallInfo {
    CallInfo::new(sql, QueryMethod::Raw).transacting(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn books() -> Connection {
        let db = Connection::open_in_memory().unwrap();
        db.raw("create table books (id integer primary key, title text)", vec![])
            .execute()
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn commit_keeps_rows() {
        let db = books().await;
        let inserted = db
            .transaction(|trx| async move {
                trx.table("books")
                    .insert(json!({ "title": "Hamlet" }))
                    .execute()
                    .await
            })
            .await
            .unwrap();
        assert_eq!(inserted, json!([1]));
        assert_eq!(db.table("books").count().execute().await.unwrap(), json!([{ "count(*)": 1 }]));
    }

    #[tokio::test]
    async fn error_rolls_back() {
        let db = books().await;
        let result: Result<(), AdapterError> = db
            .transaction(|trx| async move {
                trx.table("books")
                    .insert(json!({ "title": "Hamlet" }))
                    .execute()
                    .await?;
                Err(AdapterError::InvalidInput {
                    reason: "abort".to_string(),
                })
            })
            .await;
        assert!(result.is_err());
        assert_eq!(db.table("books").count().execute().await.unwrap(), json!([{ "count(*)": 0 }]));
    }

    #[tokio::test]
    async fn finishing_twice_is_an_error() {
        let db = books().await;
        let trx = db.begin().await.unwrap();
        trx.commit().await.unwrap();
        assert!(trx.is_completed());
        assert!(matches!(
            trx.rollback().await,
            Err(AdapterError::TransactionFinished { .. })
        ));
    }
}
