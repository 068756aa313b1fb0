//! Source of the flat node list: the Ardoq components API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::devops::RemoteError;
use crate::models::{Node, NodeKind};

/// Supplies the latest flat snapshot of architecture nodes.
#[async_trait]
pub trait NodeSource: Send + Sync {
    async fn fetch_nodes(&self) -> Result<Vec<Node>, RemoteError>;
}

/// Nodes held in memory, e.g. loaded from a JSON export.
#[async_trait]
impl NodeSource for Vec<Node> {
    async fn fetch_nodes(&self) -> Result<Vec<Node>, RemoteError> {
        Ok(self.clone())
    }
}

/// Client for one Ardoq workspace.
#[derive(Debug, Clone)]
pub struct ArdoqClient {
    base_url: String,
    token: String,
    org: Option<String>,
    workspace: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ComponentPage {
    #[serde(default)]
    values: Vec<Map<String, Value>>,
    #[serde(rename = "_links", default)]
    links: Option<PageLinks>,
}

#[derive(Debug, Deserialize)]
struct PageLinks {
    next: Option<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
}

impl ArdoqClient {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        org: Option<String>,
        workspace: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            org,
            workspace: workspace.into(),
            client: Client::new(),
        }
    }
}

impl ArdoqClient {
    /// Fetch one page. Only the first request carries the workspace filter;
    /// `next` links already include it.
    async fn fetch_page(&self, url: &str, first: bool) -> Result<ComponentPage, RemoteError> {
        let mut req = self.client.get(url).bearer_auth(&self.token);
        if first {
            req = req.query(&[("rootWorkspace", self.workspace.as_str())]);
        }
        if let Some(ref org) = self.org {
            req = req.header("X-org", org);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::NOT_FOUND => RemoteError::NotFound(body),
                StatusCode::BAD_REQUEST => RemoteError::BadRequest(body),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Unauthorized,
                _ => RemoteError::Server(format!("{}: {}", status, body)),
            });
        }
        Ok(response.json().await?)
    }

    /// Absolute URL for a `next` link, which may be relative to the base URL.
    fn resolve(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else {
            format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                href.trim_start_matches('/')
            )
        }
    }
}

#[async_trait]
impl NodeSource for ArdoqClient {
    async fn fetch_nodes(&self) -> Result<Vec<Node>, RemoteError> {
        let mut url = format!(
            "{}/api/v2/components",
            self.base_url.trim_end_matches('/')
        );
        let mut components = Vec::new();
        let mut pages = 0;

        loop {
            let page = self.fetch_page(&url, pages == 0).await?;
            pages += 1;
            components.extend(page.values);

            let Some(next) = page.links.and_then(|links| links.next) else {
                break;
            };
            let next = self.resolve(&next.href);
            if next == url {
                tracing::warn!("Ardoq returned a self-referencing next link: {}", next);
                break;
            }
            url = next;
        }

        let fetched = components.len();
        let nodes: Vec<Node> = components.into_iter().filter_map(component_to_node).collect();

        tracing::info!(
            "Fetched {} components in {} pages from workspace {} ({} hierarchy nodes)",
            fetched,
            pages,
            self.workspace,
            nodes.len()
        );
        Ok(nodes)
    }
}

/// Convert a raw component into a [`Node`], or `None` when it is not part of
/// the five-level hierarchy.
pub fn component_to_node(mut component: Map<String, Value>) -> Option<Node> {
    let id = take_string(&mut component, "_id")?;
    let type_name = take_string(&mut component, "type")?;
    let Some(kind) = NodeKind::from_type_name(&type_name) else {
        tracing::debug!("Skipping component {} of type {}", id, type_name);
        return None;
    };
    let name = take_string(&mut component, "name").unwrap_or_default();
    let parent = take_string(&mut component, "parent");

    Some(Node {
        id,
        name,
        kind,
        parent,
        attributes: component,
    })
}

fn take_string(component: &mut Map<String, Value>, key: &str) -> Option<String> {
    match component.remove(key)? {
        Value::String(s) => Some(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn component(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn maps_component_fields() {
        let node = component_to_node(component(json!({
            "_id": "abc",
            "name": "Payments",
            "type": "Initiative",
            "parent": "dom",
            "description": "Take money"
        })))
        .unwrap();

        assert_eq!(node.id, "abc");
        assert_eq!(node.kind, NodeKind::Initiative);
        assert_eq!(node.parent.as_deref(), Some("dom"));
        assert_eq!(node.attribute("description"), Some(&json!("Take money")));
        assert!(node.attribute("_id").is_none());
    }

    #[test]
    fn null_parent_is_root_level() {
        let node = component_to_node(component(json!({
            "_id": "d1",
            "name": "Commerce",
            "type": "Domain",
            "parent": null
        })))
        .unwrap();

        assert!(node.parent.is_none());
    }

    #[test]
    fn resolves_relative_next_links() {
        let client = ArdoqClient::new("https://app.ardoq.com/", "t", None, "ws");
        assert_eq!(
            client.resolve("/api/v2/components?cursor=abc"),
            "https://app.ardoq.com/api/v2/components?cursor=abc"
        );
        assert_eq!(
            client.resolve("https://eu.ardoq.com/api/v2/components?cursor=abc"),
            "https://eu.ardoq.com/api/v2/components?cursor=abc"
        );
    }

    #[test]
    fn skips_unknown_types() {
        assert!(component_to_node(component(json!({
            "_id": "c1",
            "name": "Server",
            "type": "Application"
        })))
        .is_none());
    }
}
