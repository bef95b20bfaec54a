//! Consumer loop that forwards queued change events to a long-lived stream.
//!
//! ## State machine
//!
//! ```text
//! Waiting --pop returns Event----> Forwarding --forward--> Waiting
//! Waiting --pop returns TimedOut--> IdleTick --------------> Waiting
//! ```
//!
//! The bounded wait gives the loop a liveness point every `wait` interval:
//! on an idle tick it checks whether the downstream is gone and stops if so.
//! A failed forward ends the loop. The event being forwarded is lost (it was
//! already popped); everything still queued stays for the next stream.

use super::channel::EventConsumer;
use super::error::{RecvError, SinkError};
use super::types::Event;
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Default wait window of a single pop
pub const DEFAULT_STREAM_TIMEOUT: Duration = Duration::from_secs(3);

/// Downstream side of a stream (a client connection, a test recorder, ...)
#[async_trait]
pub trait EventSink: Send {
    /// Hand one event to the downstream consumer
    async fn forward(&mut self, event: Event) -> Result<(), SinkError>;

    /// Whether the downstream is known to be gone
    fn is_closed(&self) -> bool {
        false
    }
}

/// Loop state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamState {
    Waiting,
    Forwarding(Event),
    IdleTick,
}

/// Why a loop stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamExit {
    /// Cancellation token fired (client disconnect or shutdown)
    Cancelled,
    /// Downstream write failed or the downstream was found closed
    SinkClosed(SinkError),
    /// The channel was closed and drained
    ChannelClosed,
}

/// What a finished loop did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSummary {
    pub exit: StreamExit,
    pub forwarded: u64,
    pub idle_ticks: u64,
}

/// Cooperative consumer loop over an [`EventConsumer`]
pub struct StreamLoop<S> {
    consumer: EventConsumer,
    sink: S,
    wait: Duration,
    cancel: CancellationToken,
    state: StreamState,
    forwarded: u64,
    idle_ticks: u64,
}

impl<S: EventSink> StreamLoop<S> {
    pub fn new(consumer: EventConsumer, sink: S, cancel: CancellationToken) -> Self {
        Self::with_timeout(consumer, sink, DEFAULT_STREAM_TIMEOUT, cancel)
    }

    pub fn with_timeout(
        consumer: EventConsumer,
        sink: S,
        wait: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            consumer,
            sink,
            wait,
            cancel,
            state: StreamState::Waiting,
            forwarded: 0,
            idle_ticks: 0,
        }
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// Run until cancelled, the sink closes, or the channel closes.
    ///
    /// Consumes the loop; the consumer claim is released on return.
    pub async fn run(mut self) -> StreamSummary {
        debug!(wait = ?self.wait, "Event stream started");
        let exit = loop {
            if let Some(exit) = self.step().await {
                break exit;
            }
        };
        debug!(
            exit = ?exit,
            forwarded = self.forwarded,
            idle_ticks = self.idle_ticks,
            "Event stream stopped"
        );
        StreamSummary {
            exit,
            forwarded: self.forwarded,
            idle_ticks: self.idle_ticks,
        }
    }

    /// Perform one transition. Returns `Some` when the loop must stop.
    pub async fn step(&mut self) -> Option<StreamExit> {
        match std::mem::replace(&mut self.state, StreamState::Waiting) {
            StreamState::Waiting => {
                let popped = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => return Some(StreamExit::Cancelled),
                    popped = self.consumer.pop(self.wait) => popped,
                };
                match popped {
                    Ok(event) => self.state = StreamState::Forwarding(event),
                    Err(RecvError::TimedOut) => self.state = StreamState::IdleTick,
                    Err(RecvError::Closed) => return Some(StreamExit::ChannelClosed),
                }
                None
            }
            StreamState::Forwarding(event) => {
                let result = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => return Some(StreamExit::Cancelled),
                    result = self.sink.forward(event) => result,
                };
                match result {
                    Ok(()) => {
                        self.forwarded += 1;
                        None
                    }
                    Err(e) => {
                        debug!(error = %e, "Event stream sink failed");
                        Some(StreamExit::SinkClosed(e))
                    }
                }
            }
            StreamState::IdleTick => {
                self.idle_ticks += 1;
                trace!(idle_ticks = self.idle_ticks, "Event stream idle");
                if self.sink.is_closed() {
                    return Some(StreamExit::SinkClosed(SinkError::Disconnected));
                }
                None
            }
        }
    }
}
