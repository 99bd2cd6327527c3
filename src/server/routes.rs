// HTTP routes configuration
// Author: kelexine (https://github.com/kelexine)

use super::handlers::{
    fetch_handler, health_handler, message_handler, metrics_handler, notification_click_handler,
    push_handler, sync_handler, MAX_BODY_BYTES,
};
use super::middleware::request_id_layers;
use crate::config::AppConfig;
use crate::error::Result;
use crate::network::OriginClient;
use crate::router::CacheRouter;
use axum::{routing::{get, post}, Router};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub router: CacheRouter,
    pub origin: OriginClient,
}

pub fn create_router(
    config: &AppConfig,
    router: CacheRouter,
    origin: OriginClient,
) -> Result<Router> {
    let state = AppState { router, origin };

    let (set_request_id, propagate_request_id) = request_id_layers();

    let mut app = Router::new()
        .route("/__sw/health", get(health_handler))
        .route("/__sw/metrics", get(metrics_handler))
        .route("/__sw/message", post(message_handler))
        .route("/__sw/push", post(push_handler))
        .route("/__sw/notificationclick", post(notification_click_handler))
        .route("/__sw/sync", post(sync_handler))
        .fallback(fetch_handler)
        .layer(tower_http::limit::RequestBodyLimitLayer::new(MAX_BODY_BYTES));

    if config.performance.enable_compression {
        app = app.layer(CompressionLayer::new());
    }

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id)
        .layer(set_request_id)
        .with_state(state);

    Ok(app)
}
