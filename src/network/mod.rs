// Network layer: request model and the fetcher seam
// Author: kelexine (https://github.com/kelexine)

mod client;
#[cfg(test)]
pub(crate) mod testing;

pub use client::OriginClient;

use crate::cache::ResourceResponse;
use crate::error::{Result, RouterError};
use async_trait::async_trait;
use axum::http::{header, HeaderMap, HeaderName, Method};
use bytes::Bytes;
use reqwest::Url;

/// Request headers that can turn a full 200 into a 304 or 206.
const VALIDATOR_HEADERS: [HeaderName; 6] = [
    header::IF_NONE_MATCH,
    header::IF_MODIFIED_SINCE,
    header::IF_MATCH,
    header::IF_UNMODIFIED_SINCE,
    header::IF_RANGE,
    header::RANGE,
];

/// What the requesting page intends to do with the resource
/// (mirrors the `Sec-Fetch-Dest` header).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Destination {
    Document,
    Image,
    Font,
    Script,
    Style,
    Manifest,
    #[default]
    Empty,
    Other,
}

impl Destination {
    pub fn from_header(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "document" | "iframe" | "frame" => Destination::Document,
            "image" => Destination::Image,
            "font" => Destination::Font,
            "script" | "worker" | "sharedworker" => Destination::Script,
            "style" => Destination::Style,
            "manifest" => Destination::Manifest,
            "" | "empty" => Destination::Empty,
            _ => Destination::Other,
        }
    }
}

/// Request mode (mirrors `Sec-Fetch-Mode`). Only `Navigate` changes behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    Navigate,
    SameOrigin,
    #[default]
    NoCors,
    Cors,
}

impl RequestMode {
    pub fn from_header(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "navigate" => RequestMode::Navigate,
            "same-origin" => RequestMode::SameOrigin,
            "cors" => RequestMode::Cors,
            _ => RequestMode::NoCors,
        }
    }
}

/// A resource request as seen by the router.
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    pub method: Method,
    pub url: Url,
    pub destination: Destination,
    pub mode: RequestMode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ResourceRequest {
    /// Plain GET with no destination hint.
    pub fn get(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| RouterError::InvalidRequest(format!("invalid URL {}: {}", url, e)))?;
        Ok(Self::from_url(url))
    }

    pub fn from_url(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            destination: Destination::Empty,
            mode: RequestMode::NoCors,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// `scheme://host[:port]` of the request URL.
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    /// Copy of the request without conditional and range headers, so the
    /// origin answers with a complete body that can be stored.
    pub fn without_validators(&self) -> Self {
        let mut request = self.clone();
        for name in &VALIDATOR_HEADERS {
            request.headers.remove(name);
        }
        request
    }
}

/// Anything that can perform a network fetch.
///
/// Non-2xx statuses are responses, not errors; `Err` means the network leg
/// itself failed (connection refused, timeout, DNS).
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &ResourceRequest) -> Result<ResourceResponse>;
}
