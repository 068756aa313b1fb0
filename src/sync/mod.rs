//! Replication of an Epic forest into the work-tracking system.
//!
//! A run optionally wipes the project first ([`BatchDeleter`]), then walks the
//! epics depth-first, parent before children, one remote call at a time. A
//! failed creation is recorded and its subtree skipped; siblings continue.
//! Every run ends with exactly one terminal event: `sync:complete` carrying the
//! [`SyncSummary`], or `sync:error`. The exception is a run cancelled because
//! the progress receiver went away, which has nobody left to notify.

pub mod chunk;
mod delete;

pub use delete::*;

use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::devops::{FieldMapper, RemoteError, WorkItemClient, DEFAULT_DELETE_CHUNK_SIZE};
use crate::models::*;
use crate::progress::{EventPayload, ProgressEvent, ProgressSink};

/// Errors that end a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("no epics to synchronize")]
    NoEpics,

    #[error("`{id}` is a {actual} but sits in a {expected} position")]
    KindMismatch {
        id: String,
        expected: WorkItemType,
        actual: NodeKind,
    },

    #[error("failed to list existing work items: {0}")]
    Query(#[source] RemoteError),

    #[error("overwrite aborted, nothing was created: {0}")]
    Aborted(#[from] DeleteError),

    #[error("sync cancelled: progress receiver disconnected")]
    Cancelled,
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub summary: SyncSummary,
    /// Every created item, in creation order.
    pub items: Vec<SyncedWorkItem>,
}

/// Walks a tree of epics and creates remote work items for it.
pub struct SyncOrchestrator<'a> {
    client: &'a dyn WorkItemClient,
    mapper: &'a dyn FieldMapper,
    sink: &'a dyn ProgressSink,
    delete_chunk_size: usize,
}

/// Mutable state of one run.
struct Run<'p> {
    project: &'p str,
    summary: SyncSummary,
    items: Vec<SyncedWorkItem>,
}

impl<'a> SyncOrchestrator<'a> {
    pub fn new(
        client: &'a dyn WorkItemClient,
        mapper: &'a dyn FieldMapper,
        sink: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            client,
            mapper,
            sink,
            delete_chunk_size: DEFAULT_DELETE_CHUNK_SIZE,
        }
    }

    pub fn with_delete_chunk_size(mut self, chunk_size: usize) -> Self {
        self.delete_chunk_size = chunk_size.max(1);
        self
    }

    /// Replicate `epics` into `project`, deleting existing items first when `overwrite` is set.
    pub async fn sync(
        &self,
        epics: &[Epic],
        project: &str,
        overwrite: bool,
    ) -> Result<SyncReport, SyncError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("sync", %run_id, project);

        async {
            tracing::info!(
                "Starting sync of {} epics (overwrite: {})",
                epics.len(),
                overwrite
            );
            let result = self.execute(run_id, epics, project, overwrite).await;

            match &result {
                Ok(report) => {
                    tracing::info!(
                        "Sync complete: {} created, {} failed",
                        report.summary.totals.created,
                        report.summary.totals.failed
                    );
                    self.sink.emit(ProgressEvent::new(EventPayload::SyncComplete {
                        summary: report.summary.clone(),
                    }));
                }
                Err(SyncError::Cancelled) => {
                    tracing::warn!("Progress receiver disconnected, stopping sync");
                }
                Err(e) => {
                    tracing::error!("Sync failed: {}", e);
                    self.sink.emit(ProgressEvent::new(EventPayload::SyncError {
                        error: e.to_string(),
                    }));
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        run_id: Uuid,
        epics: &[Epic],
        project: &str,
        overwrite: bool,
    ) -> Result<SyncReport, SyncError> {
        if epics.is_empty() {
            return Err(SyncError::NoEpics);
        }
        check_kinds(epics)?;

        let mut run = Run {
            project,
            summary: SyncSummary::new(run_id),
            items: Vec::new(),
        };

        if overwrite {
            run.summary.deleted = Some(self.overwrite(project).await?);
        }

        for epic in epics {
            let Some(remote_epic) = self
                .create(&mut run, WorkItemType::Epic, &epic.node, None)
                .await?
            else {
                continue;
            };

            for feature in &epic.children {
                let parent = Some(&remote_epic);
                let Some(remote_feature) = self
                    .create(&mut run, WorkItemType::Feature, &feature.node, parent)
                    .await?
                else {
                    continue;
                };

                for story in &feature.children {
                    self.create(
                        &mut run,
                        WorkItemType::UserStory,
                        &story.node,
                        Some(&remote_feature),
                    )
                    .await?;
                }
            }
        }

        run.summary.finalize();
        Ok(SyncReport {
            summary: run.summary,
            items: run.items,
        })
    }

    async fn overwrite(&self, project: &str) -> Result<usize, SyncError> {
        let ids = match self.client.query_work_item_ids(project).await {
            Ok(ids) => ids,
            Err(e) => {
                self.sink.emit(ProgressEvent::new(EventPayload::OverwriteError {
                    error: e.to_string(),
                    message: "Failed to list existing work items".to_string(),
                }));
                return Err(SyncError::Query(e));
            }
        };

        let deleted = BatchDeleter::new(self.client, self.sink)
            .with_chunk_size(self.delete_chunk_size)
            .delete_all(project, &ids)
            .await?;
        Ok(deleted)
    }

    /// Attempt one creation. `Ok(None)` means it failed and its subtree must be skipped.
    async fn create(
        &self,
        run: &mut Run<'_>,
        kind: WorkItemType,
        node: &Node,
        parent: Option<&RemoteWorkItem>,
    ) -> Result<Option<RemoteWorkItem>, SyncError> {
        if self.sink.is_closed() {
            return Err(SyncError::Cancelled);
        }

        let fields = self.mapper.map(node, kind);
        match self
            .client
            .create_work_item(run.project, kind, &fields, parent)
            .await
        {
            Ok(remote) => {
                run.summary.counts_mut(kind).record_created();
                self.sink.emit(ProgressEvent::new(EventPayload::Created {
                    kind,
                    ardoq_id: node.id.clone(),
                    name: node.name.clone(),
                    azure_dev_ops_id: remote.id,
                    azure_dev_ops_url: remote.link().to_string(),
                }));
                run.items.push(SyncedWorkItem {
                    ardoq_id: node.id.clone(),
                    kind,
                    remote: remote.clone(),
                });
                Ok(Some(remote))
            }
            Err(e) => {
                tracing::warn!("Failed to create {} {}: {}", kind, node.id, e);
                run.summary.counts_mut(kind).record_failed();
                self.sink.emit(ProgressEvent::new(EventPayload::Failed {
                    kind,
                    ardoq_id: node.id.clone(),
                    name: node.name.clone(),
                    error: e.to_string(),
                }));
                Ok(None)
            }
        }
    }
}

/// Reject the whole forest if any node sits at a level its kind does not belong to.
/// Epics given directly never went through the hierarchy builder.
fn check_kinds(epics: &[Epic]) -> Result<(), SyncError> {
    for epic in epics {
        expect_kind(&epic.node, WorkItemType::Epic)?;
        for feature in &epic.children {
            expect_kind(&feature.node, WorkItemType::Feature)?;
            for story in &feature.children {
                expect_kind(&story.node, WorkItemType::UserStory)?;
            }
        }
    }
    Ok(())
}

fn expect_kind(node: &Node, expected: WorkItemType) -> Result<(), SyncError> {
    if WorkItemType::from_node_kind(node.kind) == Some(expected) {
        return Ok(());
    }
    Err(SyncError::KindMismatch {
        id: node.id.clone(),
        expected,
        actual: node.kind,
    })
}
