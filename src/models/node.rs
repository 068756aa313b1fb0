use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The five levels of the architecture hierarchy.
///
/// Each kind has exactly one required parent kind (none for `Domain`) and at
/// most one child kind (none for `UserStory`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Domain,
    Initiative,
    Epic,
    Feature,
    #[serde(rename = "User Story", alias = "UserStory")]
    UserStory,
}

impl NodeKind {
    /// Kinds below `Domain`, in the order the builder attaches them.
    pub const NESTED: [NodeKind; 4] = [
        NodeKind::Initiative,
        NodeKind::Epic,
        NodeKind::Feature,
        NodeKind::UserStory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Domain => "Domain",
            Self::Initiative => "Initiative",
            Self::Epic => "Epic",
            Self::Feature => "Feature",
            Self::UserStory => "User Story",
        }
    }

    /// Parse a free-form type name as it appears in the architecture repository.
    ///
    /// Matching ignores case, spaces, underscores and hyphens, so `"User Story"`,
    /// `"user_story"` and `"UserStory"` are all accepted.
    pub fn from_type_name(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "domain" => Some(Self::Domain),
            "initiative" => Some(Self::Initiative),
            "epic" => Some(Self::Epic),
            "feature" => Some(Self::Feature),
            "userstory" => Some(Self::UserStory),
            _ => None,
        }
    }

    /// The kind a node of this kind must hang under.
    pub fn parent_kind(&self) -> Option<NodeKind> {
        match self {
            Self::Domain => None,
            Self::Initiative => Some(Self::Domain),
            Self::Epic => Some(Self::Initiative),
            Self::Feature => Some(Self::Epic),
            Self::UserStory => Some(Self::Feature),
        }
    }

    pub fn child_kind(&self) -> Option<NodeKind> {
        match self {
            Self::Domain => Some(Self::Initiative),
            Self::Initiative => Some(Self::Epic),
            Self::Epic => Some(Self::Feature),
            Self::Feature => Some(Self::UserStory),
            Self::UserStory => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single record from the architecture repository, before tree reconstruction.
///
/// Parent links are plain identifiers; the builder resolves them through an
/// id-indexed lookup, so nodes never hold references to each other.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Parent node id. Only `Domain` nodes may leave this empty.
    #[serde(default)]
    pub parent: Option<String>,
    /// Descriptive attributes consumed by field mapping, not by the builder.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: NodeKind,
        parent: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            parent: parent.map(str::to_string),
            attributes: Map::new(),
        }
    }

    /// Attach a descriptive attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up an attribute, treating JSON `null` as absent.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).filter(|v| !v.is_null())
    }
}
