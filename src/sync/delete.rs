//! Overwrite pre-phase: removal of existing remote work items in bounded chunks.

use thiserror::Error;

use super::chunk::chunks;
use crate::devops::{RemoteError, WorkItemClient, DEFAULT_DELETE_CHUNK_SIZE};
use crate::progress::{EventPayload, ProgressEvent, ProgressSink};

/// A chunk failed to delete. Earlier chunks are already gone; later ones were not attempted.
#[derive(Debug, Error)]
#[error("failed to delete chunk {chunk}/{total_chunks} after {deleted} deletions: {source}")]
pub struct DeleteError {
    pub chunk: usize,
    pub total_chunks: usize,
    pub deleted: usize,
    #[source]
    pub source: RemoteError,
}

/// Deletes id lists one chunk at a time, reporting each step.
pub struct BatchDeleter<'a> {
    client: &'a dyn WorkItemClient,
    sink: &'a dyn ProgressSink,
    chunk_size: usize,
}

impl<'a> BatchDeleter<'a> {
    pub fn new(client: &'a dyn WorkItemClient, sink: &'a dyn ProgressSink) -> Self {
        Self {
            client,
            sink,
            chunk_size: DEFAULT_DELETE_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Delete every id in `ids`, returning how many were deleted.
    ///
    /// Chunks run strictly in order. The first failing chunk emits
    /// `overwrite:error` and ends the deletion.
    pub async fn delete_all(&self, project: &str, ids: &[u64]) -> Result<usize, DeleteError> {
        if ids.is_empty() {
            self.sink
                .emit(ProgressEvent::new(EventPayload::OverwriteNoItems {
                    message: "No existing work items to delete".to_string(),
                }));
            return Ok(0);
        }

        let total = ids.len();
        self.sink
            .emit(ProgressEvent::new(EventPayload::OverwriteDeleting {
                message: format!(
                    "Deleting {} existing work items in chunks of {}",
                    total, self.chunk_size
                ),
                count: total,
                chunk_size: self.chunk_size,
            }));
        tracing::info!("Deleting {} work items from {}", total, project);

        let mut deleted = 0;
        for chunk in chunks(ids, self.chunk_size) {
            if let Err(source) = self.client.delete_work_items(project, chunk.items).await {
                let err = DeleteError {
                    chunk: chunk.index,
                    total_chunks: chunk.total_chunks,
                    deleted,
                    source,
                };
                tracing::error!("{}", err);
                self.sink
                    .emit(ProgressEvent::new(EventPayload::OverwriteError {
                        error: err.source.to_string(),
                        message: format!(
                            "Failed to delete chunk {}/{}; {} of {} work items were deleted",
                            chunk.index, chunk.total_chunks, deleted, total
                        ),
                    }));
                return Err(err);
            }

            deleted += chunk.items.len();
            tracing::debug!(
                "Deleted chunk {}/{} ({} items)",
                chunk.index,
                chunk.total_chunks,
                chunk.items.len()
            );
            self.sink
                .emit(ProgressEvent::new(EventPayload::OverwriteProgress {
                    message: format!(
                        "Deleted chunk {}/{} ({}/{})",
                        chunk.index, chunk.total_chunks, deleted, total
                    ),
                    deleted,
                    total,
                    current_chunk: chunk.index,
                    total_chunks: chunk.total_chunks,
                    chunk_size: chunk.items.len(),
                }));
        }

        self.sink
            .emit(ProgressEvent::new(EventPayload::OverwriteDeleted {
                message: format!("Deleted {} existing work items", deleted),
                count: deleted,
            }));
        Ok(deleted)
    }
}
