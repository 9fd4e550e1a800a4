//! Request Classification
//!
//! Decides which caching policy applies to an outgoing request.

use axum::http::Method;
use serde::Serialize;
use url::Url;

use crate::net::{AgentRequest, Destination};

// == Policy ==
/// Caching policy for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Not intercepted: non-GET, cross-origin, or a bypassed path
    PassThrough,
    /// Documents, scripts and styles: live first, stored copy on failure
    NetworkFirst,
    /// Every other same-origin GET: stored copy first
    CacheFirst,
}

/// Classifies `request` relative to the controlling page's origin.
///
/// Rules are evaluated in order:
/// 1. non-GET or cross-origin requests pass through,
/// 2. same-origin paths under a bypass prefix pass through,
/// 3. documents, scripts and styles are network-first,
/// 4. everything else is cache-first.
pub fn classify(request: &AgentRequest, page_origin: &Url, bypass_prefixes: &[String]) -> Policy {
    if request.method != Method::GET || request.url.origin() != page_origin.origin() {
        return Policy::PassThrough;
    }

    let path = request.url.path();
    if bypass_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str())) {
        return Policy::PassThrough;
    }

    match request.destination {
        Destination::Document | Destination::Script | Destination::Style => Policy::NetworkFirst,
        _ => Policy::CacheFirst,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;
    use bytes::Bytes;

    fn origin() -> Url {
        Url::parse("http://localhost:3000").unwrap()
    }

    fn get(url: &str) -> AgentRequest {
        AgentRequest::get(Url::parse(url).unwrap())
    }

    #[test]
    fn test_cross_origin_post_passes_through() {
        let request = AgentRequest::new(
            Method::POST,
            Url::parse("https://db.example.com/data-endpoint").unwrap(),
            HeaderMap::new(),
            Bytes::from_static(b"{}"),
        );
        assert_eq!(classify(&request, &origin(), &[]), Policy::PassThrough);
    }

    #[test]
    fn test_same_origin_post_passes_through() {
        let request = AgentRequest::new(
            Method::POST,
            Url::parse("http://localhost:3000/data-endpoint").unwrap(),
            HeaderMap::new(),
            Bytes::new(),
        );
        assert_eq!(classify(&request, &origin(), &[]), Policy::PassThrough);
    }

    #[test]
    fn test_cross_origin_get_passes_through() {
        let request = get("https://db.example.com/rest/v1/expenses");
        assert_eq!(classify(&request, &origin(), &[]), Policy::PassThrough);
    }

    #[test]
    fn test_different_port_is_cross_origin() {
        let request = get("http://localhost:8080/style.css");
        assert_eq!(classify(&request, &origin(), &[]), Policy::PassThrough);
    }

    #[test]
    fn test_bypass_prefix() {
        let bypass = vec!["/rest/".to_string()];
        let request = get("http://localhost:3000/rest/v1/expenses");
        assert_eq!(classify(&request, &origin(), &bypass), Policy::PassThrough);

        let request = get("http://localhost:3000/logo.png");
        assert_eq!(classify(&request, &origin(), &bypass), Policy::CacheFirst);
    }

    #[test]
    fn test_network_first_destinations() {
        for url in [
            "http://localhost:3000/index.html",
            "http://localhost:3000/assets/index-4f2a.js",
            "http://localhost:3000/style.css",
            "http://localhost:3000/",
        ] {
            assert_eq!(classify(&get(url), &origin(), &[]), Policy::NetworkFirst, "{}", url);
        }

        let navigation = get("http://localhost:3000/").with_destination(Destination::Document);
        assert_eq!(classify(&navigation, &origin(), &[]), Policy::NetworkFirst);
    }

    #[test]
    fn test_cache_first_destinations() {
        for url in [
            "http://localhost:3000/logo.png",
            "http://localhost:3000/fonts/inter.woff2",
            "http://localhost:3000/manifest.webmanifest",
        ] {
            assert_eq!(classify(&get(url), &origin(), &[]), Policy::CacheFirst, "{}", url);
        }
    }
}
