//! Reconstruction of the typed five-level tree from a flat node list.
//!
//! The builder is pure: it makes no remote calls and either returns a fully
//! validated forest or a [`ValidationError`]. A partially built tree is never
//! exposed, since synchronization relies on every parent link being correct.

use std::collections::HashMap;

use thiserror::Error;

use crate::models::*;

/// Malformed hierarchy input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("duplicate node id `{0}`")]
    DuplicateId(String),

    #[error("{kind} `{id}` has no parent, expected a {expected}")]
    MissingParent {
        id: String,
        kind: NodeKind,
        expected: NodeKind,
    },

    #[error("{kind} `{id}` references missing parent `{parent}`, expected a {expected}")]
    ParentNotFound {
        id: String,
        kind: NodeKind,
        parent: String,
        expected: NodeKind,
    },

    #[error("{kind} `{id}` expects a {expected} parent but `{parent}` is a {actual}")]
    ParentKindMismatch {
        id: String,
        kind: NodeKind,
        parent: String,
        expected: NodeKind,
        actual: NodeKind,
    },
}

/// Build the Domain forest for `nodes`.
///
/// Domains whose parent is absent or equal to `root_id` are returned, in input
/// order. Every other node is attached under its parent after checking that the
/// parent exists and has the required kind. Children keep the relative order
/// they had in the input.
pub fn build(nodes: &[Node], root_id: &str) -> Result<Vec<Domain>, ValidationError> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
    for (pos, node) in nodes.iter().enumerate() {
        if index.insert(node.id.as_str(), pos).is_some() {
            return Err(ValidationError::DuplicateId(node.id.clone()));
        }
    }

    // Children are tracked by input position, keyed by the parent's position.
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];

    let mut roots = Vec::new();
    for (pos, node) in nodes.iter().enumerate() {
        if node.kind != NodeKind::Domain {
            continue;
        }
        match node.parent.as_deref() {
            None => roots.push(pos),
            Some(parent) if parent == root_id => roots.push(pos),
            Some(parent) => {
                tracing::debug!(
                    "Skipping domain {} outside root {} (parent {})",
                    node.id,
                    root_id,
                    parent
                );
            }
        }
    }

    for kind in NodeKind::NESTED {
        let Some(expected) = kind.parent_kind() else {
            continue;
        };

        for (pos, node) in nodes.iter().enumerate().filter(|(_, n)| n.kind == kind) {
            let parent_id =
                node.parent
                    .as_deref()
                    .ok_or_else(|| ValidationError::MissingParent {
                        id: node.id.clone(),
                        kind,
                        expected,
                    })?;

            let parent_pos =
                *index
                    .get(parent_id)
                    .ok_or_else(|| ValidationError::ParentNotFound {
                        id: node.id.clone(),
                        kind,
                        parent: parent_id.to_string(),
                        expected,
                    })?;

            let actual = nodes[parent_pos].kind;
            if actual != expected {
                return Err(ValidationError::ParentKindMismatch {
                    id: node.id.clone(),
                    kind,
                    parent: parent_id.to_string(),
                    expected,
                    actual,
                });
            }

            children[parent_pos].push(pos);
        }
    }

    let tree = Assembler {
        nodes,
        children: &children,
    };
    let domains: Vec<Domain> = roots.into_iter().map(|pos| tree.domain(pos)).collect();

    tracing::debug!(
        "Built hierarchy: {} domains from {} nodes",
        domains.len(),
        nodes.len()
    );
    Ok(domains)
}

/// Materializes typed levels from the validated child lists.
struct Assembler<'a> {
    nodes: &'a [Node],
    children: &'a [Vec<usize>],
}

impl Assembler<'_> {
    fn domain(&self, pos: usize) -> Domain {
        Domain {
            node: self.nodes[pos].clone(),
            children: self.children[pos]
                .iter()
                .map(|&p| self.initiative(p))
                .collect(),
        }
    }

    fn initiative(&self, pos: usize) -> Initiative {
        Initiative {
            node: self.nodes[pos].clone(),
            children: self.children[pos].iter().map(|&p| self.epic(p)).collect(),
        }
    }

    fn epic(&self, pos: usize) -> Epic {
        Epic {
            node: self.nodes[pos].clone(),
            children: self.children[pos]
                .iter()
                .map(|&p| self.feature(p))
                .collect(),
        }
    }

    fn feature(&self, pos: usize) -> Feature {
        Feature {
            node: self.nodes[pos].clone(),
            children: self.children[pos]
                .iter()
                .map(|&p| UserStory {
                    node: self.nodes[p].clone(),
                })
                .collect(),
        }
    }
}

/// Find the epics of one initiative in a built forest.
pub fn epics_for_initiative<'a>(domains: &'a [Domain], initiative_id: &str) -> Option<&'a [Epic]> {
    domains
        .iter()
        .flat_map(|d| d.children.iter())
        .find(|i| i.node.id == initiative_id)
        .map(|i| i.children.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, kind: NodeKind, parent: Option<&str>) -> Node {
        Node::new(id, id.to_uppercase(), kind, parent)
    }

    #[test]
    fn builds_single_chain_under_root() {
        let nodes = vec![
            node("d1", NodeKind::Domain, Some("root")),
            node("i1", NodeKind::Initiative, Some("d1")),
            node("e1", NodeKind::Epic, Some("i1")),
        ];

        let forest = build(&nodes, "root").unwrap();

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].node.id, "d1");
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].node.id, "i1");
        assert_eq!(forest[0].children[0].children.len(), 1);
        assert_eq!(forest[0].children[0].children[0].node.id, "e1");
    }

    #[test]
    fn keeps_input_order_for_siblings() {
        let nodes = vec![
            node("f2", NodeKind::Feature, Some("e1")),
            node("d1", NodeKind::Domain, None),
            node("e1", NodeKind::Epic, Some("i1")),
            node("f1", NodeKind::Feature, Some("e1")),
            node("i1", NodeKind::Initiative, Some("d1")),
            node("f3", NodeKind::Feature, Some("e1")),
        ];

        let forest = build(&nodes, "root").unwrap();
        let features: Vec<&str> = forest[0].children[0].children[0]
            .children
            .iter()
            .map(|f| f.node.id.as_str())
            .collect();

        assert_eq!(features, vec!["f2", "f1", "f3"]);
    }

    #[test]
    fn rejects_wrong_parent_kind() {
        let nodes = vec![
            node("d1", NodeKind::Domain, None),
            node("i1", NodeKind::Initiative, Some("d1")),
            node("e1", NodeKind::Epic, Some("i1")),
            node("f1", NodeKind::Feature, Some("e1")),
            node("e2", NodeKind::Epic, Some("f1")),
        ];

        let err = build(&nodes, "root").unwrap_err();

        assert_eq!(
            err,
            ValidationError::ParentKindMismatch {
                id: "e2".to_string(),
                kind: NodeKind::Epic,
                parent: "f1".to_string(),
                expected: NodeKind::Initiative,
                actual: NodeKind::Feature,
            }
        );
    }

    #[test]
    fn rejects_missing_parent() {
        let nodes = vec![
            node("d1", NodeKind::Domain, None),
            node("i1", NodeKind::Initiative, Some("gone")),
        ];

        assert!(matches!(
            build(&nodes, "root"),
            Err(ValidationError::ParentNotFound { .. })
        ));
    }

    #[test]
    fn rejects_orphan_without_parent_id() {
        let nodes = vec![node("s1", NodeKind::UserStory, None)];

        assert_eq!(
            build(&nodes, "root").unwrap_err(),
            ValidationError::MissingParent {
                id: "s1".to_string(),
                kind: NodeKind::UserStory,
                expected: NodeKind::Feature,
            }
        );
    }

    #[test]
    fn rejects_duplicate_ids_across_kinds() {
        let nodes = vec![
            node("x", NodeKind::Domain, None),
            node("x", NodeKind::Initiative, Some("x")),
        ];

        assert_eq!(
            build(&nodes, "root").unwrap_err(),
            ValidationError::DuplicateId("x".to_string())
        );
    }

    #[test]
    fn omits_domains_under_a_different_root() {
        let nodes = vec![
            node("d1", NodeKind::Domain, Some("root")),
            node("d2", NodeKind::Domain, Some("elsewhere")),
        ];

        let forest = build(&nodes, "root").unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].node.id, "d1");
    }

    #[test]
    fn scopes_epics_to_initiative() {
        let nodes = vec![
            node("d1", NodeKind::Domain, None),
            node("i1", NodeKind::Initiative, Some("d1")),
            node("i2", NodeKind::Initiative, Some("d1")),
            node("e1", NodeKind::Epic, Some("i1")),
            node("e2", NodeKind::Epic, Some("i2")),
        ];
        let forest = build(&nodes, "root").unwrap();

        let epics = epics_for_initiative(&forest, "i2").unwrap();
        assert_eq!(epics.len(), 1);
        assert_eq!(epics[0].node.id, "e2");
        assert!(epics_for_initiative(&forest, "missing").is_none());
    }
}
