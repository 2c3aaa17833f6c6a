//! The execution entry point every builder call goes through.

use std::future::Future;
use std::pin::Pin;

use querymock_core::{AdapterError, CallInfo};
use serde_json::Value;

/// Future returned by [`QueryHook::execute`].
pub type HookFuture = Pin<Box<dyn Future<Output = Result<HookOutput, AdapterError>> + Send>>;

/// Raw result of one execution, before the builder post-processes it.
#[derive(Debug, Clone, PartialEq)]
pub struct HookOutput {
    pub data: Value,
    /// `data` is a collection to deliver element by element.
    pub stream: bool,
}

impl HookOutput {
    pub fn value(data: Value) -> Self {
        Self {
            data,
            stream: false,
        }
    }
}

/// A connection's execution hook. The real implementation talks to SQLite;
/// the interception shim wraps whichever hook was installed before it.
pub trait QueryHook: Send + Sync {
    fn execute(&self, call: CallInfo) -> HookFuture;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}
