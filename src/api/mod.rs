mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::ardoq::NodeSource;
use crate::config::{Config, ConfigError};
use crate::devops::{FieldMapper, WorkItemClient, DEFAULT_DELETE_CHUNK_SIZE};

/// Collaborators shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn WorkItemClient>,
    pub mapper: Arc<dyn FieldMapper>,
    /// Where `GET /hierarchy` and initiative-scoped syncs read nodes from.
    pub source: Option<Arc<dyn NodeSource>>,
    /// Parent id marking top-level domains when none is given in a request.
    pub root_id: String,
    pub delete_chunk_size: usize,
}

impl AppState {
    pub fn new(
        client: impl WorkItemClient + 'static,
        mapper: impl FieldMapper + 'static,
        root_id: impl Into<String>,
    ) -> Self {
        Self {
            client: Arc::new(client),
            mapper: Arc::new(mapper),
            source: None,
            root_id: root_id.into(),
            delete_chunk_size: DEFAULT_DELETE_CHUNK_SIZE,
        }
    }

    pub fn with_source(mut self, source: impl NodeSource + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    pub fn with_delete_chunk_size(mut self, chunk_size: usize) -> Self {
        self.delete_chunk_size = chunk_size.max(1);
        self
    }

    /// Wire the Azure DevOps client, and the Ardoq client when its credentials are set.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let state = Self::new(
            config.devops_client()?,
            config.field_mapper()?,
            config.root_id.clone(),
        )
        .with_delete_chunk_size(config.delete_chunk_size);

        match config.ardoq_client() {
            Ok(source) => Ok(state.with_source(source)),
            Err(e) => {
                tracing::warn!("Serving without an architecture repository: {}", e);
                Ok(state)
            }
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Hierarchy
        .route(
            "/hierarchy",
            get(handlers::get_hierarchy).post(handlers::build_hierarchy),
        )
        // Sync (server-sent events)
        .route("/sync", post(handlers::start_sync))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
