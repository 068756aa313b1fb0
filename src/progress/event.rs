use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{SyncSummary, WorkItemType};

/// Payload of a progress event.
///
/// Serialized without a tag: the event type travels separately (as the SSE
/// event name), see [`ProgressEvent::event_type`].
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum EventPayload {
    OverwriteNoItems {
        message: String,
    },
    OverwriteDeleting {
        message: String,
        count: usize,
        chunk_size: usize,
    },
    OverwriteProgress {
        message: String,
        deleted: usize,
        total: usize,
        current_chunk: usize,
        total_chunks: usize,
        chunk_size: usize,
    },
    OverwriteDeleted {
        message: String,
        count: usize,
    },
    OverwriteError {
        error: String,
        message: String,
    },
    Created {
        #[serde(skip)]
        kind: WorkItemType,
        ardoq_id: String,
        name: String,
        azure_dev_ops_id: u64,
        azure_dev_ops_url: String,
    },
    Failed {
        #[serde(skip)]
        kind: WorkItemType,
        ardoq_id: String,
        name: String,
        error: String,
    },
    SyncComplete {
        summary: SyncSummary,
    },
    SyncError {
        error: String,
    },
}

/// A timestamped event pushed to a [`ProgressSink`](super::ProgressSink).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProgressEvent {
    #[serde(flatten)]
    pub payload: EventPayload,
    pub timestamp: DateTime<Utc>,
}

impl ProgressEvent {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            payload,
            timestamp: Utc::now(),
        }
    }

    /// Tag identifying the event, e.g. `overwrite:progress` or `feature:failed`.
    pub fn event_type(&self) -> &'static str {
        match &self.payload {
            EventPayload::OverwriteNoItems { .. } => "overwrite:no-items",
            EventPayload::OverwriteDeleting { .. } => "overwrite:deleting",
            EventPayload::OverwriteProgress { .. } => "overwrite:progress",
            EventPayload::OverwriteDeleted { .. } => "overwrite:deleted",
            EventPayload::OverwriteError { .. } => "overwrite:error",
            EventPayload::Created { kind, .. } => match kind {
                WorkItemType::Epic => "epic:created",
                WorkItemType::Feature => "feature:created",
                WorkItemType::UserStory => "userstory:created",
            },
            EventPayload::Failed { kind, .. } => match kind {
                WorkItemType::Epic => "epic:failed",
                WorkItemType::Feature => "feature:failed",
                WorkItemType::UserStory => "userstory:failed",
            },
            EventPayload::SyncComplete { .. } => "sync:complete",
            EventPayload::SyncError { .. } => "sync:error",
        }
    }

    /// Whether this event ends a run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.payload,
            EventPayload::SyncComplete { .. } | EventPayload::SyncError { .. }
        )
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize {} event: {}", self.event_type(), e);
            serde_json::Value::Null
        })
    }
}
