use serde::{Deserialize, Serialize};

use super::Node;

/// A root of the reconstructed hierarchy.
///
/// The node fields are flattened into the JSON response, with an additional
/// `children` array holding the next level down. The same shape repeats for
/// every level except [`UserStory`], which has no children.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Domain {
    #[serde(flatten)]
    pub node: Node,
    #[serde(default)]
    pub children: Vec<Initiative>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Initiative {
    #[serde(flatten)]
    pub node: Node,
    #[serde(default)]
    pub children: Vec<Epic>,
}

/// The unit of synchronization: every Epic becomes a remote work item, and its
/// subtree is only attempted when that creation succeeds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Epic {
    #[serde(flatten)]
    pub node: Node,
    #[serde(default)]
    pub children: Vec<Feature>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    #[serde(flatten)]
    pub node: Node,
    #[serde(default)]
    pub children: Vec<UserStory>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserStory {
    #[serde(flatten)]
    pub node: Node,
}

impl Domain {
    /// Number of nodes below this domain, at every level.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|i| 1 + i.descendant_count())
            .sum()
    }
}

impl Initiative {
    pub fn descendant_count(&self) -> usize {
        self.children.iter().map(|e| 1 + e.descendant_count()).sum()
    }
}

impl Epic {
    pub fn descendant_count(&self) -> usize {
        self.children.iter().map(|f| 1 + f.children.len()).sum()
    }
}
