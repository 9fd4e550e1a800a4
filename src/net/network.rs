//! Network Module
//!
//! The agent's only way to reach the network.

use std::time::Duration;

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use tracing::debug;
use url::Url;

use crate::cache::StoredResponse;
use crate::error::{AgentError, Result};
use crate::net::AgentRequest;

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
];

// == Network Trait ==
/// Fetches a request from the network.
///
/// `Ok` means the server answered, whatever the status. `Err` means the
/// network was unreachable, timed out, or the body could not be read.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &AgentRequest) -> Result<StoredResponse>;
}

/// Removes connection-scoped headers, plus `Content-Length` since bodies are
/// re-framed after buffering.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
    headers.remove(header::CONTENT_LENGTH);
}

// == HTTP Network ==
/// Network backed by reqwest.
///
/// Same-origin requests are sent to the upstream that serves the shell;
/// anything else goes to its own URL.
#[derive(Debug, Clone)]
pub struct HttpNetwork {
    client: reqwest::Client,
    upstream: Url,
    page_origin: Url,
}

impl HttpNetwork {
    /// Creates a network client. A `timeout` bounds the whole exchange.
    pub fn new(upstream: Url, page_origin: Url, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AgentError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            upstream,
            page_origin,
        })
    }

    /// Where `url` is actually fetched from.
    pub fn target(&self, url: &Url) -> Url {
        if url.origin() != self.page_origin.origin() {
            return url.clone();
        }
        let mut target = self.upstream.clone();
        target.set_path(url.path());
        target.set_query(url.query());
        target
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &AgentRequest) -> Result<StoredResponse> {
        let target = self.target(&request.url);
        debug!("Fetching {} {}", request.method, target);

        let mut headers = request.headers.clone();
        strip_hop_by_hop(&mut headers);

        let response = self
            .client
            .request(request.method.clone(), target)
            .headers(headers)
            .body(request.body.clone())
            .send()
            .await?;

        let status = response.status();
        let mut headers = response.headers().clone();
        strip_hop_by_hop(&mut headers);

        // Read the stream exactly once; the buffer is shared from here on.
        let body = response.bytes().await?;

        Ok(StoredResponse::new(status, headers, body))
    }
}
