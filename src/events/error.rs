//! Error types of the event subsystem

use thiserror::Error;

/// Failure to enqueue an event. Only possible once the channel is closed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmitError {
    #[error("event channel is closed")]
    Closed,
}

/// Outcome of a pop that produced no event
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecvError {
    /// The channel stayed empty for the whole wait window.
    /// Expected control flow, not a fault.
    #[error("no event within the wait window")]
    TimedOut,
    #[error("event channel is closed")]
    Closed,
}

/// Failure to hand an event to the downstream consumer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("downstream consumer disconnected")]
    Disconnected,
    #[error("failed to write event downstream: {0}")]
    Write(String),
}
