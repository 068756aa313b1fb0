//! ASCII tree rendering for built hierarchies.

use crate::models::{Domain, Epic, Feature, Initiative, Node, NodeKind};

const INITIATIVE: char = '◆';
const EPIC: char = '■';
const FEATURE: char = '●';
const USER_STORY: char = '•';

/// Get the symbol for a node kind. Domains are rendered without one.
fn kind_symbol(kind: NodeKind) -> Option<char> {
    match kind {
        NodeKind::Domain => None,
        NodeKind::Initiative => Some(INITIATIVE),
        NodeKind::Epic => Some(EPIC),
        NodeKind::Feature => Some(FEATURE),
        NodeKind::UserStory => Some(USER_STORY),
    }
}

/// Kind-erased view of one level, so a single recursion renders all five.
struct Branch<'a> {
    node: &'a Node,
    children: Vec<Branch<'a>>,
}

impl<'a> From<&'a Domain> for Branch<'a> {
    fn from(d: &'a Domain) -> Self {
        Branch {
            node: &d.node,
            children: d.children.iter().map(Branch::from).collect(),
        }
    }
}

impl<'a> From<&'a Initiative> for Branch<'a> {
    fn from(i: &'a Initiative) -> Self {
        Branch {
            node: &i.node,
            children: i.children.iter().map(Branch::from).collect(),
        }
    }
}

impl<'a> From<&'a Epic> for Branch<'a> {
    fn from(e: &'a Epic) -> Self {
        Branch {
            node: &e.node,
            children: e.children.iter().map(Branch::from).collect(),
        }
    }
}

impl<'a> From<&'a Feature> for Branch<'a> {
    fn from(f: &'a Feature) -> Self {
        Branch {
            node: &f.node,
            children: f
                .children
                .iter()
                .map(|s| Branch {
                    node: &s.node,
                    children: Vec::new(),
                })
                .collect(),
        }
    }
}

/// Render a domain forest as ASCII art with kind symbols.
///
/// Example output:
/// ```text
/// Commerce
/// └── ◆ Payments
///     ├── ■ Checkout
///     │   └── ● Card payments
///     │       └── • Pay with saved card
///     └── ■ Refunds
/// ```
pub fn render_tree(domains: &[Domain]) -> String {
    let mut output = String::new();
    for (i, domain) in domains.iter().enumerate() {
        let is_last = i == domains.len() - 1;
        render_node(&mut output, &Branch::from(domain), "", is_last, true);
    }
    output
}

/// Recursively render a node and its children.
fn render_node(
    output: &mut String,
    branch: &Branch<'_>,
    prefix: &str,
    is_last: bool,
    is_root: bool,
) {
    if is_root {
        output.push_str(&branch.node.name);
        output.push('\n');
    } else {
        let connector = if is_last { "└── " } else { "├── " };
        output.push_str(prefix);
        output.push_str(connector);
        if let Some(symbol) = kind_symbol(branch.node.kind) {
            output.push(symbol);
            output.push(' ');
        }
        output.push_str(&branch.node.name);
        output.push('\n');
    }

    let child_prefix = if is_root {
        String::new()
    } else {
        let continuation = if is_last { "    " } else { "│   " };
        format!("{}{}", prefix, continuation)
    };

    for (i, child) in branch.children.iter().enumerate() {
        let child_is_last = i == branch.children.len() - 1;
        render_node(output, child, &child_prefix, child_is_last, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::build;

    fn node(id: &str, name: &str, kind: NodeKind, parent: Option<&str>) -> Node {
        Node::new(id, name, kind, parent)
    }

    #[test]
    fn test_single_domain() {
        let forest = build(&[node("d1", "Commerce", NodeKind::Domain, None)], "root").unwrap();
        assert_eq!(render_tree(&forest), "Commerce\n");
    }

    #[test]
    fn test_full_depth() {
        let nodes = vec![
            node("d1", "Commerce", NodeKind::Domain, None),
            node("i1", "Payments", NodeKind::Initiative, Some("d1")),
            node("e1", "Checkout", NodeKind::Epic, Some("i1")),
            node("f1", "Card payments", NodeKind::Feature, Some("e1")),
            node("s1", "Pay with saved card", NodeKind::UserStory, Some("f1")),
            node("e2", "Refunds", NodeKind::Epic, Some("i1")),
        ];
        let forest = build(&nodes, "root").unwrap();

        let expected = concat!(
            "Commerce\n",
            "└── ◆ Payments\n",
            "    ├── ■ Checkout\n",
            "    │   └── ● Card payments\n",
            "    │       └── • Pay with saved card\n",
            "    └── ■ Refunds\n",
        );
        assert_eq!(render_tree(&forest), expected);
    }

    #[test]
    fn test_multiple_domains() {
        let nodes = vec![
            node("d1", "Commerce", NodeKind::Domain, None),
            node("d2", "Logistics", NodeKind::Domain, None),
            node("i1", "Shipping", NodeKind::Initiative, Some("d2")),
        ];
        let forest = build(&nodes, "root").unwrap();

        assert_eq!(
            render_tree(&forest),
            "Commerce\nLogistics\n└── ◆ Shipping\n"
        );
    }
}
