//! In-process event queue between CRUD handlers and the event stream
//!
//! Producers push from any task without blocking (unbounded). A single
//! consumer pops with a bounded wait; the receiving half sits behind a mutex
//! so that at most one stream drains the queue at a time.

use super::error::{EmitError, RecvError};
use super::types::{Event, EventEmitter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, OwnedMutexGuard};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Unbounded FIFO of change events.
///
/// Construct one per server (or per test) and share it as `Arc<EventChannel>`:
/// the producer side as `Arc<dyn EventEmitter>`, the consumer side through
/// [`EventChannel::try_consumer`].
#[derive(Debug)]
pub struct EventChannel {
    sender: mpsc::UnboundedSender<Event>,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<Event>>>,
}

impl EventChannel {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    /// Append an event to the tail. Never blocks.
    pub fn push(&self, event: Event) -> Result<(), EmitError> {
        self.sender.send(event).map_err(|_| EmitError::Closed)
    }

    /// Remove and return the head, waiting at most `timeout` for one to arrive.
    ///
    /// Waits for a running stream to release the consumer side within the
    /// same window. Cancel-safe: dropping the future never loses an event.
    pub async fn pop(&self, timeout: Duration) -> Result<Event, RecvError> {
        let deadline = deadline_after(timeout);
        let mut receiver = tokio::time::timeout_at(deadline, self.receiver.lock())
            .await
            .map_err(|_| RecvError::TimedOut)?;
        recv_until(&mut receiver, deadline).await
    }

    /// Claim the consumer side for a long-lived stream.
    ///
    /// Returns `None` while another consumer holds it.
    pub fn try_consumer(&self) -> Option<EventConsumer> {
        self.receiver
            .clone()
            .try_lock_owned()
            .ok()
            .map(|receiver| EventConsumer { receiver })
    }

    /// Whether a consumer currently holds the receiving side
    pub fn is_streaming(&self) -> bool {
        self.receiver.try_lock().is_err()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Close the channel. Later pushes fail; queued events can still be popped.
    pub async fn close(&self) {
        self.receiver.lock().await.close();
        debug!("Event channel closed");
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl EventEmitter for EventChannel {
    fn emit(&self, event: Event) {
        match self.sender.send(event) {
            Ok(()) => debug!("Change event queued"),
            Err(mpsc::error::SendError(event)) => {
                warn!(event = %event, "Event channel closed, dropping change event");
            }
        }
    }
}

/// Exclusive consumer handle. Releases the channel when dropped.
#[derive(Debug)]
pub struct EventConsumer {
    receiver: OwnedMutexGuard<mpsc::UnboundedReceiver<Event>>,
}

impl EventConsumer {
    /// Same contract as [`EventChannel::pop`], without contending for the lock
    pub async fn pop(&mut self, timeout: Duration) -> Result<Event, RecvError> {
        recv_until(&mut self.receiver, deadline_after(timeout)).await
    }
}

/// `now + timeout`, saturating to a far-future instant instead of overflowing
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_secs(86400 * 365 * 30))
}

async fn recv_until(
    receiver: &mut mpsc::UnboundedReceiver<Event>,
    deadline: Instant,
) -> Result<Event, RecvError> {
    match tokio::time::timeout_at(deadline, receiver.recv()).await {
        Ok(Some(event)) => Ok(event),
        Ok(None) => Err(RecvError::Closed),
        Err(_) => Err(RecvError::TimedOut),
    }
}
