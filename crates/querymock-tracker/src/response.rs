//! Response channel: the one-shot link between a query record and the caller
//! suspended on it.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use querymock_core::{QueryError, UnsettledPolicy};
use serde_json::Value;
use tokio::sync::oneshot;

/// How a response should be delivered to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseOptions {
    /// Deliver the data element by element on a streaming call.
    pub stream: bool,
}

impl ResponseOptions {
    pub fn stream() -> Self {
        Self { stream: true }
    }
}

/// The data a caller receives for an answered query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse {
    pub data: Value,
    pub stream: bool,
}

/// Outcome carried over the channel.
#[derive(Debug)]
pub(crate) enum Settlement {
    Resolved(QueryResponse),
    Rejected(QueryError),
}

/// Create the channel for the query at `step`.
pub(crate) fn channel(step: u64, policy: UnsettledPolicy) -> (ResponseSender, PendingResponse) {
    let (tx, rx) = oneshot::channel();
    (
        ResponseSender { tx },
        PendingResponse { rx, step, policy },
    )
}

/// Producer half. Lives inside the record and is consumed by the first settlement.
#[derive(Debug)]
pub(crate) struct ResponseSender {
    tx: oneshot::Sender<Settlement>,
}

impl ResponseSender {
    /// Deliver the outcome. Returns false when the caller stopped waiting.
    pub(crate) fn send(self, settlement: Settlement) -> bool {
        self.tx.send(settlement).is_ok()
    }
}

/// Future handed back to the interception shim. Completes when the record is
/// answered.
#[derive(Debug)]
pub struct PendingResponse {
    rx: oneshot::Receiver<Settlement>,
    step: u64,
    policy: UnsettledPolicy,
}

impl PendingResponse {
    /// Step of the query this response belongs to.
    pub fn step(&self) -> u64 {
        self.step
    }
}

impl Future for PendingResponse {
    type Output = Result<QueryResponse, QueryError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(Ok(Settlement::Resolved(response))) => Poll::Ready(Ok(response)),
            Poll::Ready(Ok(Settlement::Rejected(error))) => Poll::Ready(Err(error)),
            Poll::Ready(Err(_)) => match this.policy {
                UnsettledPolicy::Fail => Poll::Ready(Err(QueryError::Abandoned { step: this.step })),
                // Nothing can wake us again: the caller stays pending.
                UnsettledPolicy::Hang => Poll::Pending,
            },
            Poll::Pending => Poll::Pending,
        }
    }
}
