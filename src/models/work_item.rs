use std::fmt;

use serde::{Deserialize, Serialize};

use super::NodeKind;

/// Work item types created in the work-tracking system.
///
/// Only the three lowest levels of the hierarchy are replicated; Domains and
/// Initiatives exist only in the architecture repository.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WorkItemType {
    Epic,
    Feature,
    #[serde(rename = "User Story")]
    UserStory,
}

impl WorkItemType {
    /// Remote type name, as used in the create URL and WIQL queries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Epic => "Epic",
            Self::Feature => "Feature",
            Self::UserStory => "User Story",
        }
    }

    /// The work item type a node of `kind` is replicated as, if any.
    pub fn from_node_kind(kind: NodeKind) -> Option<Self> {
        match kind {
            NodeKind::Epic => Some(Self::Epic),
            NodeKind::Feature => Some(Self::Feature),
            NodeKind::UserStory => Some(Self::UserStory),
            NodeKind::Domain | NodeKind::Initiative => None,
        }
    }
}

impl fmt::Display for WorkItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a work item as issued by the remote system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteWorkItem {
    pub id: u64,
    /// REST resource URL, used when linking children to this item.
    pub url: String,
    /// Browser URL, if the remote system returned one.
    pub html_url: Option<String>,
}

impl RemoteWorkItem {
    /// The link shown to users: the browser URL when known, else the API URL.
    pub fn link(&self) -> &str {
        self.html_url.as_deref().unwrap_or(&self.url)
    }
}

/// A created remote item correlated with the local node it replicates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncedWorkItem {
    pub ardoq_id: String,
    pub kind: WorkItemType,
    pub remote: RemoteWorkItem,
}
