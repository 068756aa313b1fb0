//! In-memory stand-in for the work-tracking system.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use ardoq_sync::devops::{FieldPatch, RemoteError, WorkItemClient, TITLE_FIELD};
use ardoq_sync::models::*;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateCall {
    pub kind: WorkItemType,
    pub title: String,
    pub parent: Option<u64>,
}

/// Records every call; fails creations whose title is in `fail_titles` and
/// the delete call numbered `fail_delete_call` (1-based).
#[derive(Default)]
pub struct MockClient {
    next_id: AtomicU64,
    pub existing: Vec<u64>,
    pub fail_titles: HashSet<String>,
    pub fail_delete_call: Option<usize>,
    pub fail_query: bool,
    pub created: Mutex<Vec<CreateCall>>,
    pub deleted: Mutex<Vec<Vec<u64>>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1000),
            ..Default::default()
        }
    }

    pub fn with_existing(mut self, count: u64) -> Self {
        self.existing = (1..=count).collect();
        self
    }

    pub fn failing(mut self, title: &str) -> Self {
        self.fail_titles.insert(title.to_string());
        self
    }

    pub fn failing_delete_call(mut self, call: usize) -> Self {
        self.fail_delete_call = Some(call);
        self
    }

    pub fn created(&self) -> Vec<CreateCall> {
        self.created.lock().unwrap().clone()
    }

    pub fn delete_calls(&self) -> Vec<Vec<u64>> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkItemClient for MockClient {
    async fn create_work_item(
        &self,
        project: &str,
        kind: WorkItemType,
        fields: &FieldPatch,
        parent: Option<&RemoteWorkItem>,
    ) -> Result<RemoteWorkItem, RemoteError> {
        let title = fields[TITLE_FIELD].as_str().unwrap_or_default().to_string();
        if self.fail_titles.contains(&title) {
            return Err(RemoteError::BadRequest(format!("rejected {}", title)));
        }

        self.created.lock().unwrap().push(CreateCall {
            kind,
            title,
            parent: parent.map(|p| p.id),
        });

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(RemoteWorkItem {
            id,
            url: format!("https://dev.azure.com/org/_apis/wit/workItems/{}", id),
            html_url: Some(format!(
                "https://dev.azure.com/org/{}/_workitems/edit/{}",
                project, id
            )),
        })
    }

    async fn query_work_item_ids(&self, _project: &str) -> Result<Vec<u64>, RemoteError> {
        if self.fail_query {
            return Err(RemoteError::Unauthorized);
        }
        Ok(self.existing.clone())
    }

    async fn delete_work_items(&self, _project: &str, ids: &[u64]) -> Result<(), RemoteError> {
        let mut deleted = self.deleted.lock().unwrap();
        deleted.push(ids.to_vec());
        if self.fail_delete_call == Some(deleted.len()) {
            return Err(RemoteError::Server("503 Service Unavailable".to_string()));
        }
        Ok(())
    }
}

pub fn story(id: &str) -> UserStory {
    UserStory {
        node: Node::new(id, id, NodeKind::UserStory, None),
    }
}

pub fn feature(id: &str, stories: Vec<UserStory>) -> Feature {
    Feature {
        node: Node::new(id, id, NodeKind::Feature, None),
        children: stories,
    }
}

pub fn epic(id: &str, features: Vec<Feature>) -> Epic {
    Epic {
        node: Node::new(id, id, NodeKind::Epic, None),
        children: features,
    }
}
