//! # querymock-tracker
//!
//! The interception and response-correlation engine.
//!
//! An adapter's interception shim hands every call to [`Tracker::capture`].
//! While installed, the tracker records the call as a [`QueryRecord`],
//! numbers it, publishes it to `query` listeners, and returns a
//! [`PendingResponse`] that completes only when test code calls
//! [`QueryRecord::response`] or [`QueryRecord::reject`].
//!
//! ```
//! use querymock_core::{CallInfo, QueryMethod};
//! use querymock_tracker::{Capture, Tracker};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let tracker = Tracker::new();
//! tracker.install();
//! tracker.on(|query, _step| {
//!     query.response(json!([{ "id": 1 }]))?;
//!     Ok(())
//! });
//!
//! let call = CallInfo::new(r#"select * from "users""#, QueryMethod::Select);
//! let Capture::Intercepted(pending) = tracker.capture(call).unwrap() else {
//!     unreachable!("tracker is installed");
//! };
//! assert_eq!(pending.await.unwrap().data, json!([{ "id": 1 }]));
//! assert_eq!(tracker.queries().count(), 1);
//! # }
//! ```

pub mod events;
pub mod history;
pub mod record;
pub mod response;
pub mod tracing_setup;
pub mod tracker;

pub use events::{EventChannel, Listener, ListenerId};
pub use history::QueryHistory;
pub use record::{QueryRecord, Rejection};
pub use response::{PendingResponse, QueryResponse, ResponseOptions};
pub use tracker::{Capture, Queries, Tracker};
