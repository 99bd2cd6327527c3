//! Axum-based HTTP front for the cache router.
//!
//! Every request outside `/__sw/` becomes a fetch event for the
//! [`CacheRouter`](crate::router::CacheRouter); the `/__sw/` routes deliver
//! the other events (message, push, notification click, sync) and expose
//! health and metrics.
//!
//! # Components
//!
//! - `handlers`: One handler per event, plus health and metrics.
//! - `middleware`: Request ID layers and the response source header.
//! - `routes`: The main router configuration that ties everything together.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod handlers;
mod middleware;
mod routes;

pub use middleware::SOURCE_HEADER;
pub use routes::{create_router, AppState};
