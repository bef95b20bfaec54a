//! Change event subsystem for the server-push notification stream
//!
//! This module provides:
//! - `Event`: the text description of a committed book mutation
//! - `EventEmitter`: producer contract called by CRUD code after a commit
//! - `EventChannel`: unbounded FIFO between producers and the single stream
//! - `StreamLoop`: consumer loop forwarding events to an `EventSink`

mod channel;
pub mod error;
pub mod stream;
mod types;

pub use channel::{EventChannel, EventConsumer};
pub use error::{EmitError, RecvError, SinkError};
pub use stream::{
    EventSink, StreamExit, StreamLoop, StreamState, StreamSummary, DEFAULT_STREAM_TIMEOUT,
};
pub use types::{CrudAction, Event, EventEmitter};
