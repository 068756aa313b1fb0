use std::convert::Infallible;

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use futures::stream::{self, Stream};

use super::AppState;
use crate::ardoq::NodeSource;
use crate::devops::RemoteError;
use crate::hierarchy::{self, ValidationError};
use crate::models::*;
use crate::progress::{ChannelSink, ProgressEvent};
use crate::sync::SyncOrchestrator;

// ============================================================
// Error Handling
// ============================================================

/// Hierarchy problems are the caller's to fix, so the message is returned as-is.
fn validation_error(e: ValidationError) -> (StatusCode, String) {
    tracing::warn!("Validation error: {}", e);
    (StatusCode::BAD_REQUEST, e.to_string())
}

/// Log an upstream failure and return a sanitized response to the client.
fn remote_error(e: RemoteError) -> (StatusCode, String) {
    tracing::error!("Remote error: {}", e);
    (
        StatusCode::BAD_GATEWAY,
        "Failed to reach the architecture repository".to_string(),
    )
}

/// The configured node source, or 503 when the server runs without one.
fn node_source(state: &AppState) -> Result<&dyn NodeSource, (StatusCode, String)> {
    state.source.as_deref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "No architecture repository is configured".to_string(),
        )
    })
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Hierarchy
// ============================================================

pub async fn build_hierarchy(
    State(state): State<AppState>,
    Json(input): Json<BuildHierarchyInput>,
) -> Result<Json<Vec<Domain>>, (StatusCode, String)> {
    let root_id = input.root_id.as_deref().unwrap_or(&state.root_id);
    hierarchy::build(&input.nodes, root_id)
        .map(Json)
        .map_err(validation_error)
}

pub async fn get_hierarchy(
    State(state): State<AppState>,
) -> Result<Json<Vec<Domain>>, (StatusCode, String)> {
    let nodes = node_source(&state)?
        .fetch_nodes()
        .await
        .map_err(remote_error)?;
    hierarchy::build(&nodes, &state.root_id)
        .map(Json)
        .map_err(validation_error)
}

// ============================================================
// Sync
// ============================================================

/// Start a sync run and stream its progress as server-sent events.
///
/// Everything that can be rejected up front (malformed hierarchy, unknown
/// initiative, nothing to sync) is answered with an error status before the
/// stream opens. Once streaming, each event's name is its type tag and its
/// data is the JSON payload; the stream closes after the terminal event.
pub async fn start_sync(
    State(state): State<AppState>,
    Json(mut request): Json<SyncRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, String)> {
    let epics = resolve_epics(&state, &mut request).await?;
    if epics.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "No epics to synchronize".to_string()));
    }

    let (sink, rx) = ChannelSink::channel();
    let SyncRequest {
        project, overwrite, ..
    } = request;

    tokio::spawn(async move {
        let orchestrator =
            SyncOrchestrator::new(state.client.as_ref(), state.mapper.as_ref(), &sink)
                .with_delete_chunk_size(state.delete_chunk_size);
        if let Err(e) = orchestrator.sync(&epics, &project, overwrite).await {
            tracing::debug!("Sync run for {} ended early: {}", project, e);
        }
    });

    // Stop after the terminal event rather than waiting for the sender to drop.
    let events = stream::unfold(Some(rx), |rx| async move {
        let mut rx = rx?;
        let event = rx.recv().await?;
        let rx = (!event.is_terminal()).then_some(rx);
        Some((Ok::<_, Infallible>(sse_event(&event)), rx))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Pick the epics for a request: given directly, built from supplied nodes, or
/// built from a fresh snapshot of the node source.
async fn resolve_epics(
    state: &AppState,
    request: &mut SyncRequest,
) -> Result<Vec<Epic>, (StatusCode, String)> {
    if let Some(epics) = request.epics.take() {
        return Ok(epics);
    }

    let nodes = match request.nodes.take() {
        Some(nodes) => nodes,
        None => node_source(state)?
            .fetch_nodes()
            .await
            .map_err(remote_error)?,
    };
    let root_id = request.root_id.as_deref().unwrap_or(&state.root_id);
    let forest = hierarchy::build(&nodes, root_id).map_err(validation_error)?;

    let initiative_id = request.initiative_id.as_deref().ok_or((
        StatusCode::BAD_REQUEST,
        "initiativeId is required unless epics are supplied".to_string(),
    ))?;

    hierarchy::epics_for_initiative(&forest, initiative_id)
        .map(<[Epic]>::to_vec)
        .ok_or((
            StatusCode::BAD_REQUEST,
            format!("Initiative not found: {}", initiative_id),
        ))
}

fn sse_event(event: &ProgressEvent) -> Event {
    Event::default()
        .event(event.event_type())
        .data(event.to_json().to_string())
}
