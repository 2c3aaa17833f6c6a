//! Structured tracing for the tracker: span constructors and named events.

pub mod events;
pub mod spans;
