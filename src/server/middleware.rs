// HTTP middleware
// Author: kelexine (https://github.com/kelexine)

use axum::http::{HeaderName, HeaderValue};
use axum::response::Response;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Response header naming where the body came from: `cache`, `network`,
/// `offline` or `bypass`.
pub const SOURCE_HEADER: HeaderName = HeaderName::from_static("x-fluxcache");

/// Create request ID layers for the application
pub fn request_id_layers() -> (SetRequestIdLayer<MakeRequestUuid>, PropagateRequestIdLayer) {
    (
        SetRequestIdLayer::x_request_id(MakeRequestUuid),
        PropagateRequestIdLayer::x_request_id(),
    )
}

/// Stamp the source header on an outgoing response.
pub fn tag_source(mut response: Response, source: &'static str) -> Response {
    response
        .headers_mut()
        .insert(SOURCE_HEADER, HeaderValue::from_static(source));
    response
}
