//! API Handlers
//!
//! The proxy handler every page request goes through, plus admin endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, Uri},
    response::Response,
    Json,
};
use url::Url;

use crate::agent::{AgentOptions, Served, ServedFrom, ShellAgent};
use crate::cache::MemoryStorage;
use crate::config::Config;
use crate::error::{AgentError, Result};
use crate::models::{CacheInfo, CachesResponse, HealthResponse, StatsResponse};
use crate::net::{AgentRequest, HttpNetwork};

/// Largest request body forwarded by the proxy.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Header naming where a proxied response came from.
pub const SOURCE_HEADER: &str = "x-shell-cache";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<ShellAgent>,
}

impl AppState {
    /// Creates a new AppState around an agent.
    pub fn new(agent: ShellAgent) -> Self {
        Self {
            agent: Arc::new(agent),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Uses in-memory storage and a reqwest network pointed at the upstream.
    pub fn from_config(config: &Config) -> Result<Self> {
        let options = AgentOptions::from_config(config)?;
        let upstream = Url::parse(&config.upstream_url).map_err(|e| {
            AgentError::InvalidRequest(format!("Invalid upstream {}: {}", config.upstream_url, e))
        })?;
        let timeout = (config.fetch_timeout > 0).then(|| Duration::from_secs(config.fetch_timeout));
        let network = HttpNetwork::new(upstream, options.page_origin.clone(), timeout)?;

        Ok(Self::new(ShellAgent::new(
            options,
            Arc::new(MemoryStorage::new()),
            Arc::new(network),
        )))
    }
}

/// Fallback handler for every non-admin request.
///
/// Runs the request through the agent. A request the agent could not answer
/// from either network or cache becomes `502 Bad Gateway`.
pub async fn proxy_handler(State(state): State<AppState>, request: Request) -> Result<Response> {
    let (parts, body) = request.into_parts();
    let url = resolve_url(&parts.uri, &state.agent.options().page_origin)?;
    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| AgentError::InvalidRequest(format!("Unreadable request body: {}", e)))?;

    let request = AgentRequest::new(parts.method, url, parts.headers, body);
    let served = state.agent.handle_fetch(&request).await?;

    Ok(into_response(served))
}

/// Absolute URL of a request target.
///
/// Origin-form targets (`/path?query`) belong to the page origin;
/// absolute-form targets keep their own origin.
pub fn resolve_url(uri: &Uri, page_origin: &Url) -> Result<Url> {
    let resolved = if uri.scheme().is_some() && uri.authority().is_some() {
        Url::parse(&uri.to_string())
    } else {
        let target = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        page_origin.join(target)
    };

    resolved.map_err(|e| AgentError::InvalidRequest(format!("Invalid request target {}: {}", uri, e)))
}

/// Converts a served response, tagging its source. Stored copies also carry
/// an `Age` header.
fn into_response(served: Served) -> Response {
    let Served { response, source } = served;
    let age = match source {
        ServedFrom::Cache | ServedFrom::Fallback => Some(response.age_secs()),
        ServedFrom::Network | ServedFrom::PassThrough => None,
    };

    let mut http = Response::new(Body::from(response.body));
    *http.status_mut() = response.status;
    *http.headers_mut() = response.headers;
    http.headers_mut()
        .insert(SOURCE_HEADER, HeaderValue::from_static(source.as_str()));
    if let Some(age) = age {
        http.headers_mut().insert(header::AGE, HeaderValue::from(age));
    }
    http
}

/// Handler for GET /__agent/health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.agent.is_controlling().await))
}

/// Handler for GET /__agent/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(state.agent.stats().await))
}

/// Handler for GET /__agent/caches
pub async fn caches_handler(State(state): State<AppState>) -> Result<Json<CachesResponse>> {
    let agent = &state.agent;
    let generation = &agent.options().generation;

    let caches = agent
        .cache_summary()
        .await?
        .into_iter()
        .map(|(name, entries)| CacheInfo {
            current: generation.owns(&name),
            name,
            entries,
        })
        .collect();

    Ok(Json(CachesResponse {
        generation: generation.id().to_string(),
        state: agent.state().await,
        static_cache: generation.static_name(),
        dynamic_cache: generation.dynamic_name(),
        caches,
    }))
}
