//! Cached response and key models.

// Author: kelexine (https://github.com/kelexine)

use crate::network::ResourceRequest;
use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use reqwest::Url;
use serde::Serialize;

/// Identity of a stored entry: the absolute request URL without fragment.
///
/// Only GET requests reach the cache, so the method is implied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey(String);

impl RequestKey {
    pub fn from_url(url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&ResourceRequest> for RequestKey {
    fn from(request: &ResourceRequest) -> Self {
        Self::from_url(&request.url)
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A complete response: status, headers and a fully buffered body.
///
/// Cloning is cheap; the body is reference counted.
#[derive(Debug, Clone)]
pub struct ResourceResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ResourceResponse {
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Plain-text response, used for the offline answers.
    pub fn text(status: u16, body: &'static str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        Self::new(status, headers, Bytes::from_static(body.as_bytes()))
    }

    /// Only complete 200 responses are written to a partition.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200
    }

    /// The `response.ok` notion: any 2xx status.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl IntoResponse for ResourceResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Snapshot of a partition for health reporting.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PartitionStats {
    pub name: String,
    pub entries: usize,
}
