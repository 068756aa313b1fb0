//! HTTP client for the Azure DevOps work item tracking API.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Method, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;

use super::{FieldPatch, RemoteError, WorkItemClient};
use crate::models::{RemoteWorkItem, WorkItemType};

const API_VERSION: &str = "7.1";

/// Link type that makes the new item a child of the referenced one.
const PARENT_LINK: &str = "System.LinkTypes.Hierarchy-Reverse";

/// Azure DevOps client authenticated with a personal access token.
#[derive(Debug, Clone)]
pub struct AzureDevOpsClient {
    /// Organization URL, e.g. `https://dev.azure.com/contoso`.
    org_url: String,
    pat: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct WorkItemResponse {
    id: u64,
    url: String,
    #[serde(rename = "_links", default)]
    links: Option<WorkItemLinks>,
}

#[derive(Debug, Deserialize)]
struct WorkItemLinks {
    html: Option<Href>,
}

#[derive(Debug, Deserialize)]
struct Href {
    href: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WiqlResponse {
    #[serde(default)]
    work_items: Vec<WorkItemReference>,
}

#[derive(Debug, Deserialize)]
struct WorkItemReference {
    id: u64,
}

#[derive(Debug, Default, Deserialize)]
struct DeleteBatchResponse {
    #[serde(default)]
    results: Vec<DeleteResult>,
}

#[derive(Debug, Deserialize)]
struct DeleteResult {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    code: Option<u16>,
}

impl AzureDevOpsClient {
    pub fn new(org_url: impl Into<String>, pat: impl Into<String>) -> Self {
        Self {
            org_url: org_url.into(),
            pat: pat.into(),
            client: Client::new(),
        }
    }

    /// `{org}/{project}/_apis/wit/{segments...}` with each segment percent-encoded.
    fn url(&self, project: &str, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = Url::parse(&self.org_url)
            .map_err(|e| RemoteError::InvalidUrl(format!("{}: {}", self.org_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| RemoteError::InvalidUrl(self.org_url.clone()))?
            .pop_if_empty()
            .push(project)
            .extend(["_apis", "wit"])
            .extend(segments);
        Ok(url)
    }

    /// Build an authenticated request with the API version pinned.
    fn request(
        &self,
        method: Method,
        project: &str,
        segments: &[&str],
    ) -> Result<reqwest::RequestBuilder, RemoteError> {
        let url = self.url(project, segments)?;
        Ok(self
            .client
            .request(method, url)
            .basic_auth("", Some(&self.pat))
            .query(&[("api-version", API_VERSION)]))
    }

    /// Handle response, converting HTTP errors to RemoteError.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, RemoteError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(status_error(status, body))
        }
    }
}

fn status_error(status: StatusCode, body: String) -> RemoteError {
    match status {
        StatusCode::NOT_FOUND => RemoteError::NotFound(body),
        StatusCode::BAD_REQUEST => RemoteError::BadRequest(body),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Unauthorized,
        _ => RemoteError::Server(format!("{}: {}", status, body)),
    }
}

#[async_trait]
impl WorkItemClient for AzureDevOpsClient {
    async fn create_work_item(
        &self,
        project: &str,
        kind: WorkItemType,
        fields: &FieldPatch,
        parent: Option<&RemoteWorkItem>,
    ) -> Result<RemoteWorkItem, RemoteError> {
        let mut ops: Vec<serde_json::Value> = fields
            .iter()
            .map(|(field, value)| {
                json!({
                    "op": "add",
                    "path": format!("/fields/{}", field),
                    "value": value,
                })
            })
            .collect();

        if let Some(parent) = parent {
            ops.push(json!({
                "op": "add",
                "path": "/relations/-",
                "value": { "rel": PARENT_LINK, "url": parent.url },
            }));
        }

        let type_segment = format!("${}", kind.as_str());
        let response = self
            .request(Method::POST, project, &["workitems", type_segment.as_str()])?
            .header(CONTENT_TYPE, "application/json-patch+json")
            .json(&ops)
            .send()
            .await?;

        let created: WorkItemResponse = self.handle_response(response).await?;
        tracing::debug!("Created {} #{} in {}", kind, created.id, project);

        Ok(RemoteWorkItem {
            id: created.id,
            url: created.url,
            html_url: created.links.and_then(|l| l.html).map(|h| h.href),
        })
    }

    async fn query_work_item_ids(&self, project: &str) -> Result<Vec<u64>, RemoteError> {
        let query = format!(
            "SELECT [System.Id] FROM WorkItems \
             WHERE [System.TeamProject] = @project \
             AND [System.WorkItemType] IN ('{}', '{}', '{}') \
             ORDER BY [System.Id]",
            WorkItemType::Epic,
            WorkItemType::Feature,
            WorkItemType::UserStory,
        );

        let response = self
            .request(Method::POST, project, &["wiql"])?
            .json(&json!({ "query": query }))
            .send()
            .await?;

        let result: WiqlResponse = self.handle_response(response).await?;
        Ok(result.work_items.into_iter().map(|w| w.id).collect())
    }

    async fn delete_work_items(&self, project: &str, ids: &[u64]) -> Result<(), RemoteError> {
        let response = self
            .request(Method::POST, project, &["workitemsdelete"])?
            .json(&json!({
                "ids": ids,
                "destroy": true,
                "skipNotifications": true,
            }))
            .send()
            .await?;

        let batch: DeleteBatchResponse = self.handle_response(response).await?;
        let rejected: Vec<u64> = batch
            .results
            .iter()
            .filter(|r| r.code.is_some_and(|c| !(200..300).contains(&c)))
            .filter_map(|r| r.id)
            .collect();

        if rejected.is_empty() {
            Ok(())
        } else {
            Err(RemoteError::Server(format!(
                "{} of {} work items could not be deleted: {:?}",
                rejected.len(),
                ids.len(),
                rejected
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_encoded_project_urls() {
        let client = AzureDevOpsClient::new("https://dev.azure.com/contoso/", "pat");
        let url = client
            .url("My Project", &["workitems", "$User Story"])
            .unwrap();

        assert_eq!(
            url.path(),
            "/contoso/My%20Project/_apis/wit/workitems/$User%20Story"
        );
    }

    #[test]
    fn rejects_invalid_org_url() {
        let client = AzureDevOpsClient::new("not a url", "pat");
        assert!(matches!(
            client.url("p", &["wiql"]),
            Err(RemoteError::InvalidUrl(_))
        ));
    }

    #[test]
    fn maps_forbidden_to_unauthorized() {
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, String::new()),
            RemoteError::Unauthorized
        ));
    }
}
