// HTTP request handlers
// Author: kelexine (https://github.com/kelexine)

use super::middleware::tag_source;
use super::routes::AppState;
use crate::cache::{CacheStorage, PartitionStats};
use crate::error::{Result, RouterError};
use crate::network::{Destination, Fetcher, RequestMode, ResourceRequest};
use crate::router::{ClickOutcome, CleanupReport, ClientMessage, FetchOutcome, WorkerState};
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Largest request body forwarded to the origin on passthrough.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub state: WorkerState,
    pub origin: String,
    pub partitions: Vec<PartitionStats>,
    pub timestamp: String,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let worker_state = state.router.state();
    let status = if worker_state.can_intercept() {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    Json(HealthResponse {
        status,
        state: worker_state,
        origin: state.router.config().origin.to_string(),
        partitions: state.router.storage().stats().await,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::gather_metrics(),
    )
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub handled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<CleanupReport>,
}

/// Client message, e.g. `{"action": "CLEAN_CACHE"}`
pub async fn message_handler(
    State(state): State<AppState>,
    Json(message): Json<ClientMessage>,
) -> Json<MessageResponse> {
    let cleanup = state.router.handle_message(&message).await;
    Json(MessageResponse {
        handled: cleanup.is_some(),
        cleanup,
    })
}

/// Push message with a text payload. An empty body carries no payload.
pub async fn push_handler(State(state): State<AppState>, body: String) -> Response {
    let payload = (!body.is_empty()).then_some(body.as_str());
    match state.router.handle_push(payload) {
        Some(notification) => Json(notification).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct NotificationClick {
    #[serde(default)]
    pub action: Option<String>,
}

pub async fn notification_click_handler(
    State(state): State<AppState>,
    Json(click): Json<NotificationClick>,
) -> Json<ClickOutcome> {
    Json(state.router.handle_notification_click(click.action.as_deref()))
}

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub tag: String,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub handled: bool,
}

pub async fn sync_handler(
    State(state): State<AppState>,
    Json(sync): Json<SyncRequest>,
) -> Json<SyncResponse> {
    Json(SyncResponse {
        handled: state.router.handle_sync(&sync.tag).await,
    })
}

/// Every path outside `/__sw/` is a fetch event.
pub async fn fetch_handler(State(state): State<AppState>, request: Request) -> Result<Response> {
    let request = to_resource_request(&state, request).await?;

    match state.router.handle_fetch(&request).await {
        FetchOutcome::Respond(served) => {
            Ok(tag_source(served.response.into_response(), served.source.as_str()))
        }
        FetchOutcome::Passthrough => {
            debug!("Passing {} {} through", request.method, request.url);
            let response = state.origin.fetch(&request).await?;
            Ok(tag_source(response.into_response(), "bypass"))
        }
    }
}

async fn to_resource_request(state: &AppState, request: Request<Body>) -> Result<ResourceRequest> {
    let (parts, body) = request.into_parts();

    // Absolute-form URIs (forward proxy style) are used as-is
    let url = if parts.uri.scheme().is_some() && parts.uri.authority().is_some() {
        Url::parse(&parts.uri.to_string())
            .map_err(|e| RouterError::InvalidRequest(format!("invalid URI {}: {}", parts.uri, e)))?
    } else {
        let path = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        state.origin.resolve(path)?
    };

    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| RouterError::InvalidRequest(format!("unreadable body: {}", e)))?;

    Ok(ResourceRequest {
        method: parts.method,
        destination: destination_of(&parts.headers),
        mode: mode_of(&parts.headers),
        url,
        headers: parts.headers,
        body,
    })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn destination_of(headers: &HeaderMap) -> Destination {
    header_str(headers, "sec-fetch-dest")
        .map(Destination::from_header)
        .unwrap_or_default()
}

/// `Sec-Fetch-Mode` when present; otherwise a request accepting HTML is
/// treated as a navigation.
fn mode_of(headers: &HeaderMap) -> RequestMode {
    match header_str(headers, "sec-fetch-mode") {
        Some(mode) => RequestMode::from_header(mode),
        None => match header_str(headers, header::ACCEPT.as_str()) {
            Some(accept) if accept.contains("text/html") => RequestMode::Navigate,
            _ => RequestMode::NoCors,
        },
    }
}
