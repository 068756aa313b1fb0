//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

use thiserror::Error;

use crate::ardoq::ArdoqClient;
use crate::devops::{AzureDevOpsClient, DefaultFieldMapper, DEFAULT_DELETE_CHUNK_SIZE};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ARDOQ_URL: &str = "https://app.ardoq.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),

    #[error("failed to read field mapping {path}: {source}")]
    MappingIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid field mapping {path}: {source}")]
    MappingJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Settings for both remote systems and the HTTP server.
///
/// Every value is optional at load time; the accessors that build clients
/// report which variable is missing when a command actually needs it.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP port (from ARDOQ_SYNC_PORT)
    pub port: u16,
    /// Ardoq base URL (from ARDOQ_URL)
    pub ardoq_url: String,
    /// Ardoq API token (from ARDOQ_API_TOKEN)
    pub ardoq_token: Option<String>,
    /// Ardoq organization label sent as `X-org` (from ARDOQ_ORG)
    pub ardoq_org: Option<String>,
    /// Workspace holding the hierarchy (from ARDOQ_WORKSPACE)
    pub ardoq_workspace: Option<String>,
    /// Parent id that marks top-level domains (from ARDOQ_ROOT_ID)
    pub root_id: String,
    /// Azure DevOps organization URL (from AZURE_DEVOPS_ORG_URL)
    pub devops_org_url: Option<String>,
    /// Azure DevOps personal access token (from AZURE_DEVOPS_PAT)
    pub devops_pat: Option<String>,
    /// Ids per delete call in overwrite mode (from ARDOQ_SYNC_DELETE_CHUNK_SIZE)
    pub delete_chunk_size: usize,
    /// JSON file with `attribute -> field` overrides (from ARDOQ_SYNC_FIELD_MAPPING)
    pub field_mapping: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("ARDOQ_SYNC_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let delete_chunk_size = lookup("ARDOQ_SYNC_DELETE_CHUNK_SIZE")
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_DELETE_CHUNK_SIZE);

        Self {
            port,
            ardoq_url: lookup("ARDOQ_URL").unwrap_or_else(|| DEFAULT_ARDOQ_URL.to_string()),
            ardoq_token: lookup("ARDOQ_API_TOKEN"),
            ardoq_org: lookup("ARDOQ_ORG"),
            ardoq_workspace: lookup("ARDOQ_WORKSPACE"),
            root_id: lookup("ARDOQ_ROOT_ID").unwrap_or_default(),
            devops_org_url: lookup("AZURE_DEVOPS_ORG_URL"),
            devops_pat: lookup("AZURE_DEVOPS_PAT"),
            delete_chunk_size,
            field_mapping: lookup("ARDOQ_SYNC_FIELD_MAPPING").map(PathBuf::from),
        }
    }

    pub fn devops_client(&self) -> Result<AzureDevOpsClient, ConfigError> {
        let org_url = self
            .devops_org_url
            .clone()
            .ok_or(ConfigError::Missing("AZURE_DEVOPS_ORG_URL"))?;
        let pat = self
            .devops_pat
            .clone()
            .ok_or(ConfigError::Missing("AZURE_DEVOPS_PAT"))?;
        Ok(AzureDevOpsClient::new(org_url, pat))
    }

    pub fn ardoq_client(&self) -> Result<ArdoqClient, ConfigError> {
        let token = self
            .ardoq_token
            .clone()
            .ok_or(ConfigError::Missing("ARDOQ_API_TOKEN"))?;
        let workspace = self
            .ardoq_workspace
            .clone()
            .ok_or(ConfigError::Missing("ARDOQ_WORKSPACE"))?;
        Ok(ArdoqClient::new(
            self.ardoq_url.clone(),
            token,
            self.ardoq_org.clone(),
            workspace,
        ))
    }

    /// The default mapper, with overrides from the configured file if any.
    pub fn field_mapper(&self) -> Result<DefaultFieldMapper, ConfigError> {
        let Some(path) = &self.field_mapping else {
            return Ok(DefaultFieldMapper::new());
        };
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::MappingIo {
            path: path.clone(),
            source,
        })?;
        DefaultFieldMapper::from_json(&json).map_err(|source| ConfigError::MappingJson {
            path: path.clone(),
            source,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
