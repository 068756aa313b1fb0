//! Work-tracking side of the sync: the remote client seam and field mapping.

mod client;
mod fields;

pub use client::*;
pub use fields::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{RemoteWorkItem, WorkItemType};

/// Largest id list the remote delete endpoint accepts in one call.
pub const DEFAULT_DELETE_CHUNK_SIZE: usize = 200;

/// Errors from a single remote call.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: access token missing or invalid")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),
}

/// Remote work-item operations, scoped to a project.
#[async_trait]
pub trait WorkItemClient: Send + Sync {
    /// Create one work item, linked under `parent` when given.
    async fn create_work_item(
        &self,
        project: &str,
        kind: WorkItemType,
        fields: &FieldPatch,
        parent: Option<&RemoteWorkItem>,
    ) -> Result<RemoteWorkItem, RemoteError>;

    /// Ids of every existing Epic, Feature and User Story in the project.
    async fn query_work_item_ids(&self, project: &str) -> Result<Vec<u64>, RemoteError>;

    /// Permanently delete the given work items.
    async fn delete_work_items(&self, project: &str, ids: &[u64]) -> Result<(), RemoteError>;
}
