use serde::{Deserialize, Serialize};

use super::{Epic, Node};

/// Input for starting a synchronization run.
///
/// The epics to replicate come from the first source present: `epics` as
/// given, else a forest built from `nodes`, else a fresh snapshot from the
/// configured node source. Built forests are scoped by `initiative_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    /// Target project in the work-tracking system.
    pub project: String,
    /// Delete every existing Epic, Feature and User Story in the project first.
    #[serde(default)]
    pub overwrite: bool,
    pub initiative_id: Option<String>,
    pub epics: Option<Vec<Epic>>,
    pub nodes: Option<Vec<Node>>,
    /// Root id for building from `nodes`. Defaults to the configured root.
    pub root_id: Option<String>,
}

/// Input for building a hierarchy from a flat node list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildHierarchyInput {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub root_id: Option<String>,
}
