// Request classification
// Author: kelexine (https://github.com/kelexine)

use super::strategy::Strategy;
use super::RouterConfig;
use crate::network::{Destination, ResourceRequest};
use axum::http::Method;
use once_cell::sync::Lazy;
use regex::Regex;

static IMAGE_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|gif|webp|svg|ico)$").expect("valid regex"));

static FONT_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(woff|woff2|ttf|eot)$").expect("valid regex"));

/// Which kind of resource a request is for. Decides strategy and partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    Critical,
    Image,
    Font,
    External,
    Dynamic,
}

/// The two cache partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Shell HTML/CSS/JS, fonts, external origins.
    Static,
    /// Images and everything fetched at runtime.
    Dynamic,
}

impl ResourceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceClass::Critical => "critical",
            ResourceClass::Image => "image",
            ResourceClass::Font => "font",
            ResourceClass::External => "external",
            ResourceClass::Dynamic => "dynamic",
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            ResourceClass::Critical | ResourceClass::Image => Strategy::CacheFirst,
            ResourceClass::Font | ResourceClass::External => Strategy::StaleWhileRevalidate,
            ResourceClass::Dynamic => Strategy::NetworkFirst,
        }
    }

    pub fn partition(&self) -> Partition {
        match self {
            ResourceClass::Critical | ResourceClass::Font | ResourceClass::External => {
                Partition::Static
            }
            ResourceClass::Image | ResourceClass::Dynamic => Partition::Dynamic,
        }
    }
}

/// Only GET requests over http(s) are intercepted; everything else goes to
/// the network untouched.
pub fn should_intercept(request: &ResourceRequest) -> bool {
    request.method == Method::GET && matches!(request.url.scheme(), "http" | "https")
}

/// Classify a request. Precedence is fixed: critical, image, font, external,
/// then dynamic as the fallback.
pub fn classify(request: &ResourceRequest, config: &RouterConfig) -> ResourceClass {
    let path = request.url.path();

    if is_critical(path, config) {
        ResourceClass::Critical
    } else if request.destination == Destination::Image || IMAGE_EXTENSION.is_match(path) {
        ResourceClass::Image
    } else if request.destination == Destination::Font || FONT_EXTENSION.is_match(path) {
        ResourceClass::Font
    } else if config.cacheable_origins.contains(&request.origin()) {
        ResourceClass::External
    } else {
        ResourceClass::Dynamic
    }
}

fn is_critical(path: &str, config: &RouterConfig) -> bool {
    config
        .critical_resources
        .iter()
        .any(|resource| path == resource || path.ends_with(resource.as_str()))
}
