//! # querymock-adapter
//!
//! A small SQLite query builder whose execution entry point is a swappable
//! [`QueryHook`], the [`InterceptionShim`] that routes that hook through a
//! tracker, and the [`MockRegistry`] that mocks and unmocks connections.
//!
//! ```
//! use querymock_adapter::{Connection, MockRegistry};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Connection::open_in_memory()?;
//! let registry = MockRegistry::new();
//! registry.mock(&db)?;
//!
//! let tracker = registry.tracker();
//! tracker.install();
//! tracker.on(|query, _step| {
//!     query.response(json!([{ "a": "A" }, { "a": "C" }]))?;
//!     Ok(())
//! });
//!
//! let values = db.table("table").pluck("a").execute().await?;
//! assert_eq!(values, json!(["A", "C"]));
//!
//! tracker.uninstall();
//! registry.unmock(&db);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod connection;
pub mod hook;
pub mod registry;
mod shape;
pub mod shim;
pub mod sqlite;
pub mod stream;
pub mod transaction;

pub use builder::{QueryBuilder, RawQuery};
pub use connection::Connection;
pub use hook::{HookFuture, HookOutput, QueryHook};
pub use registry::MockRegistry;
pub use shim::InterceptionShim;
pub use sqlite::SqliteHook;
pub use stream::RowStream;
pub use transaction::Transaction;
