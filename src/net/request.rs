//! Outgoing Request Module
//!
//! The request a controlled page makes, as seen by the agent.

use axum::http::{header, HeaderMap, Method};
use bytes::Bytes;
use url::Url;

// == Destination ==
/// What the page intends to do with the response.
///
/// Mirrors the `Sec-Fetch-Dest` request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Document,
    Script,
    Style,
    Image,
    Font,
    Manifest,
    Other,
}

impl Destination {
    /// Parses a `Sec-Fetch-Dest` value.
    pub fn from_fetch_dest(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "document" => Destination::Document,
            "script" | "worker" | "sharedworker" | "serviceworker" => Destination::Script,
            "style" => Destination::Style,
            "image" => Destination::Image,
            "font" => Destination::Font,
            "manifest" => Destination::Manifest,
            _ => Destination::Other,
        }
    }

    /// Guesses the destination when the page sent no `Sec-Fetch-Dest`.
    ///
    /// Uses the path extension first. A directory path such as `/` or an
    /// `Accept: text/html` hint marks a navigation.
    pub fn infer(url: &Url, headers: &HeaderMap) -> Self {
        let path = url.path();
        let extension = path
            .rsplit('/')
            .next()
            .and_then(|segment| segment.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("js" | "mjs" | "cjs") => return Destination::Script,
            Some("css") => return Destination::Style,
            Some("png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" | "avif") => {
                return Destination::Image
            }
            Some("woff" | "woff2" | "ttf" | "otf" | "eot") => return Destination::Font,
            Some("webmanifest") => return Destination::Manifest,
            Some("html" | "htm") => return Destination::Document,
            _ => {}
        }

        let wants_html = headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(|accept| accept.contains("text/html"))
            .unwrap_or(false);

        if wants_html || path.ends_with('/') {
            Destination::Document
        } else {
            Destination::Other
        }
    }
}

// == Agent Request ==
/// An outgoing request from a controlled page.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    pub method: Method,
    /// Absolute target URL
    pub url: Url,
    pub destination: Destination,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl AgentRequest {
    /// Builds a request, reading the destination from `Sec-Fetch-Dest` when
    /// present and inferring it otherwise.
    pub fn new(method: Method, url: Url, headers: HeaderMap, body: Bytes) -> Self {
        let destination = headers
            .get("sec-fetch-dest")
            .and_then(|v| v.to_str().ok())
            .map(Destination::from_fetch_dest)
            .unwrap_or_else(|| Destination::infer(&url, &headers));

        Self {
            method,
            url,
            destination,
            headers,
            body,
        }
    }

    /// A bodiless GET request.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url, HeaderMap::new(), Bytes::new())
    }

    /// Overrides the destination.
    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }
}
