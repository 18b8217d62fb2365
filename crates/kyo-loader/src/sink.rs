//! Push-model event delivery.

use std::sync::{Arc, Mutex, PoisonError};

use kyo_core::entities::LoadEvent;
use tokio::sync::mpsc::UnboundedSender;

/// Receives every event as soon as it is stamped, in sequence order.
///
/// Sinks must not fail the load: delivery problems are logged and the sink
/// keeps going or goes quiet.
pub trait EventSink: Send {
    fn accept(&mut self, event: &LoadEvent);

    /// Called once after the last event.
    fn finish(&mut self) {}
}

/// Collects events into a shared buffer readable while the load runs.
#[derive(Debug, Clone, Default)]
pub struct VecSink {
    events: Arc<Mutex<Vec<LoadEvent>>>,
}

impl VecSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything received so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LoadEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventSink for VecSink {
    fn accept(&mut self, event: &LoadEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

/// Forwards events over an unbounded tokio channel.
#[derive(Debug)]
pub struct ChannelSink {
    tx: UnboundedSender<LoadEvent>,
    closed: bool,
}

impl ChannelSink {
    #[must_use]
    pub const fn new(tx: UnboundedSender<LoadEvent>) -> Self {
        Self { tx, closed: false }
    }
}

impl EventSink for ChannelSink {
    fn accept(&mut self, event: &LoadEvent) {
        if self.closed {
            return;
        }
        if self.tx.send(event.clone()).is_err() {
            tracing::debug!("event receiver dropped; channel sink closed");
            self.closed = true;
        }
    }
}

/// Mirrors events into the tracing log at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn accept(&mut self, event: &LoadEvent) {
        tracing::debug!(
            seq = event.sequence_number,
            event = %event.event_type,
            path = %event.path,
            document = event.document_ref.as_deref().unwrap_or(""),
            task = event.task_ref.as_deref().unwrap_or(""),
            error = event.error_message.as_deref().unwrap_or(""),
            "load event"
        );
    }
}
