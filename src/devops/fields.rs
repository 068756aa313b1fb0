use std::collections::BTreeMap;

use serde_json::Value;

use crate::models::{Node, WorkItemType};

/// Remote field values keyed by field reference name (e.g. `System.Title`).
pub type FieldPatch = BTreeMap<String, Value>;

pub const TITLE_FIELD: &str = "System.Title";
pub const DESCRIPTION_FIELD: &str = "System.Description";
pub const ACCEPTANCE_CRITERIA_FIELD: &str = "Microsoft.VSTS.Common.AcceptanceCriteria";

/// Translates a local node into remote field values.
pub trait FieldMapper: Send + Sync {
    fn map(&self, node: &Node, kind: WorkItemType) -> FieldPatch;
}

impl<F> FieldMapper for F
where
    F: Fn(&Node, WorkItemType) -> FieldPatch + Send + Sync,
{
    fn map(&self, node: &Node, kind: WorkItemType) -> FieldPatch {
        self(node, kind)
    }
}

/// Maps the node name to the title, the common descriptive attributes to their
/// standard fields, and any configured `attribute -> field` overrides on top.
#[derive(Debug, Clone, Default)]
pub struct DefaultFieldMapper {
    overrides: BTreeMap<String, String>,
}

impl DefaultFieldMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(overrides: BTreeMap<String, String>) -> Self {
        Self { overrides }
    }

    /// Parse overrides from a JSON object of `{ "attribute": "Remote.Field" }`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::with_overrides(serde_json::from_str(json)?))
    }
}

impl FieldMapper for DefaultFieldMapper {
    fn map(&self, node: &Node, kind: WorkItemType) -> FieldPatch {
        let mut patch = FieldPatch::new();
        patch.insert(TITLE_FIELD.to_string(), Value::String(node.name.clone()));

        if let Some(description) = node.attribute("description") {
            patch.insert(DESCRIPTION_FIELD.to_string(), description.clone());
        }

        if kind == WorkItemType::UserStory {
            if let Some(criteria) = node.attribute("acceptanceCriteria") {
                patch.insert(ACCEPTANCE_CRITERIA_FIELD.to_string(), criteria.clone());
            }
        }

        for (attribute, field) in &self.overrides {
            if let Some(value) = node.attribute(attribute) {
                patch.insert(field.clone(), value.clone());
            }
        }

        patch
    }
}
