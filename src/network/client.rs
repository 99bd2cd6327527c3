// Origin HTTP client
// Author: kelexine (https://github.com/kelexine)

use super::{Fetcher, ResourceRequest};
use crate::cache::ResourceResponse;
use crate::config::{OriginConfig, PerformanceConfig};
use crate::error::{Result, RouterError};
use async_trait::async_trait;
use axum::http::{header, HeaderMap, HeaderName};
use reqwest::{Client, Url};
use std::time::{Duration, Instant};
use tracing::debug;

/// Headers that describe a single hop and must not be forwarded or stored.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Client for the static site origin and the allow-listed third-party origins.
///
/// Relative paths are resolved against the configured base URL; absolute URLs
/// are fetched as-is.
#[derive(Clone)]
pub struct OriginClient {
    http_client: Client,
    base_url: Url,
}

impl OriginClient {
    pub fn new(config: &OriginConfig, performance: &PerformanceConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            RouterError::Config(format!("invalid origin base URL {}: {}", config.base_url, e))
        })?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(performance.connection_pool_size)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .build()
            .map_err(|e| RouterError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        debug!("Created origin client for {}", base_url);

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an origin-form path (`/a/b?c`) against the base URL.
    pub fn resolve(&self, path_and_query: &str) -> Result<Url> {
        self.base_url
            .join(path_and_query)
            .map_err(|e| RouterError::InvalidRequest(format!("bad path {}: {}", path_and_query, e)))
    }

    fn forwardable(headers: &HeaderMap) -> HeaderMap {
        let mut out = HeaderMap::new();
        for (name, value) in headers {
            // reqwest sets Host itself, and identity bodies keep stored copies usable
            if is_hop_by_hop(name)
                || name == header::HOST
                || name == header::ACCEPT_ENCODING
                || name == header::CONTENT_LENGTH
            {
                continue;
            }
            out.append(name.clone(), value.clone());
        }
        out
    }
}

#[async_trait]
impl Fetcher for OriginClient {
    async fn fetch(&self, request: &ResourceRequest) -> Result<ResourceResponse> {
        let started = Instant::now();
        let origin = request.origin();

        let response = self
            .http_client
            .request(request.method.clone(), request.url.clone())
            .headers(Self::forwardable(&request.headers))
            .body(request.body.clone())
            .send()
            .await
            .map_err(|e| {
                crate::metrics::record_origin_fetch(&origin, "error", started.elapsed().as_secs_f64());
                RouterError::Network(format!("{} {}: {}", request.method, request.url, e))
            })?;

        let status = response.status().as_u16();
        let mut headers = HeaderMap::new();
        for (name, value) in response.headers() {
            if !is_hop_by_hop(name) && name != header::CONTENT_LENGTH {
                headers.append(name.clone(), value.clone());
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RouterError::Network(format!("reading body of {}: {}", request.url, e)))?;

        crate::metrics::record_origin_fetch(&origin, &status.to_string(), started.elapsed().as_secs_f64());
        debug!("Fetched {} -> {} ({} bytes)", request.url, status, body.len());

        Ok(ResourceResponse::new(status, headers, body))
    }
}
