//! Push-based progress reporting for sync runs.
//!
//! The orchestrator and the batch deleter only see the [`ProgressSink`] trait.
//! Transports implement it: [`ChannelSink`] feeds the streaming HTTP response,
//! [`TracingSink`] backs the CLI, and [`RecordingSink`] keeps events in memory.

mod event;

use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;

pub use event::*;

/// Receiver of structured run events.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);

    /// True once nobody is listening any more. Checked between node creations.
    fn is_closed(&self) -> bool {
        false
    }
}

/// Forwards events over an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        Self { tx }
    }

    /// Create a sink together with the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: ProgressEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::debug!("Dropping {} event, receiver closed", e.0.event_type());
        }
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn emit(&self, event: ProgressEvent) {
        match &event.payload {
            EventPayload::Failed { ardoq_id, error, .. } => {
                tracing::warn!("{} {}: {}", event.event_type(), ardoq_id, error)
            }
            EventPayload::OverwriteError { error, .. } | EventPayload::SyncError { error } => {
                tracing::error!("{}: {}", event.event_type(), error)
            }
            EventPayload::Created {
                ardoq_id,
                azure_dev_ops_id,
                ..
            } => tracing::info!(
                "{} {} -> #{}",
                event.event_type(),
                ardoq_id,
                azure_dev_ops_id
            ),
            EventPayload::OverwriteNoItems { message }
            | EventPayload::OverwriteDeleting { message, .. }
            | EventPayload::OverwriteProgress { message, .. }
            | EventPayload::OverwriteDeleted { message, .. } => {
                tracing::info!("{}: {}", event.event_type(), message)
            }
            EventPayload::SyncComplete { summary } => tracing::info!(
                "{}: {} created, {} failed",
                event.event_type(),
                summary.totals.created,
                summary.totals.failed
            ),
        }
    }
}

/// Keeps every event in memory, in emission order.
///
/// [`RecordingSink::closing_after`] simulates a caller that disconnects after
/// a fixed number of events.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
    close_after: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn closing_after(events: usize) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            close_after: Some(events),
        }
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Event type tags, in emission order.
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(ProgressEvent::event_type)
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    fn is_closed(&self) -> bool {
        match self.close_after {
            Some(limit) => {
                self.events
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .len()
                    >= limit
            }
            None => false,
        }
    }
}
