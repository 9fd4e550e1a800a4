//! Fetch Interceptor
//!
//! Routes each outgoing request to a policy executor.

use serde::Serialize;
use tracing::{debug, warn};

use crate::agent::{classify, Policy, ShellAgent};
use crate::cache::{RequestKey, StoredResponse};
use crate::error::{AgentError, Result};
use crate::net::AgentRequest;

// == Served Response ==
/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServedFrom {
    /// Live network response
    Network,
    /// Cache-first hit
    Cache,
    /// Network-first fallback to a stored copy
    Fallback,
    /// Forwarded without interception
    PassThrough,
}

impl ServedFrom {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServedFrom::Network => "network",
            ServedFrom::Cache => "cache",
            ServedFrom::Fallback => "fallback",
            ServedFrom::PassThrough => "pass-through",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Served {
    pub response: StoredResponse,
    pub source: ServedFrom,
}

impl Served {
    fn new(response: StoredResponse, source: ServedFrom) -> Self {
        Self { response, source }
    }
}

/// Outcome of intercepting one request.
#[derive(Debug)]
pub enum Interception {
    /// Not intercepted; the request goes to the network untouched
    PassThrough,
    /// Substitute response
    Respond(Served),
    /// Intercepted, but neither network nor cache had an answer
    NoResponse(AgentError),
}

impl ShellAgent {
    // == Intercept ==
    /// Classifies `request` and runs the matching executor.
    ///
    /// Nothing is intercepted until the agent controls pages.
    pub async fn intercept(&self, request: &AgentRequest) -> Interception {
        let policy = if self.is_controlling().await {
            classify(
                request,
                &self.options.page_origin,
                &self.options.bypass_prefixes,
            )
        } else {
            Policy::PassThrough
        };

        let executed = match policy {
            Policy::PassThrough => {
                self.stats.write().await.record_bypass();
                return Interception::PassThrough;
            }
            Policy::NetworkFirst => self.network_first(request).await,
            Policy::CacheFirst => self.cache_first(request).await,
        };

        match executed {
            Ok(served) => {
                debug!("{} {} served from {}", request.method, request.url, served.source.as_str());
                Interception::Respond(served)
            }
            Err(err) => {
                debug!("{} {} has no response: {}", request.method, request.url, err);
                Interception::NoResponse(err)
            }
        }
    }

    /// Intercepts `request` and forwards it when it is not intercepted.
    pub async fn handle_fetch(&self, request: &AgentRequest) -> Result<Served> {
        match self.intercept(request).await {
            Interception::PassThrough => {
                let response = self.pass_through(request).await?;
                Ok(Served::new(response, ServedFrom::PassThrough))
            }
            Interception::Respond(served) => Ok(served),
            Interception::NoResponse(err) => Err(err),
        }
    }

    // == Pass Through ==
    /// Sends `request` to the network without reading or writing any store.
    pub async fn pass_through(&self, request: &AgentRequest) -> Result<StoredResponse> {
        self.network.fetch(request).await
    }

    // == Network First ==
    /// Live response first, stored in the dynamic store on success. When the
    /// network is unreachable, the dynamic store's copy is returned instead,
    /// or the pre-cached copy when the dynamic store has none.
    pub async fn network_first(&self, request: &AgentRequest) -> Result<Served> {
        let key = cache_key(request)?;

        let err = match self.fetch(request).await {
            Ok(response) => {
                self.store_dynamic(key, &response).await;
                return Ok(Served::new(response, ServedFrom::Network));
            }
            Err(err) => err,
        };

        let generation = &self.options.generation;
        let fallback_order = [generation.dynamic_name(), generation.static_name()];
        match self.storage.match_any(&fallback_order, &key).await {
            Ok(Some(stored)) => {
                self.stats.write().await.record_fallback();
                Ok(Served::new(stored, ServedFrom::Fallback))
            }
            Ok(None) => Err(AgentError::NoResponse(format!("{} ({})", key, err))),
            Err(lookup) => {
                warn!("Fallback lookup for {} failed: {}", key, lookup);
                Err(AgentError::NoResponse(format!("{} ({})", key, err)))
            }
        }
    }

    // == Cache First ==
    /// Stored copy from either store first; on a miss, the network response is
    /// stored in the dynamic store and returned.
    pub async fn cache_first(&self, request: &AgentRequest) -> Result<Served> {
        let key = cache_key(request)?;

        match self.storage.match_any(&self.options.cache_names(), &key).await {
            Ok(Some(stored)) => {
                self.stats.write().await.record_hit();
                return Ok(Served::new(stored, ServedFrom::Cache));
            }
            Ok(None) => {}
            Err(lookup) => warn!("Cache lookup for {} failed: {}", key, lookup),
        }
        self.stats.write().await.record_miss();

        let response = self
            .fetch(request)
            .await
            .map_err(|err| AgentError::NoResponse(format!("{} ({})", key, err)))?;
        self.store_dynamic(key, &response).await;
        Ok(Served::new(response, ServedFrom::Network))
    }

    async fn fetch(&self, request: &AgentRequest) -> Result<StoredResponse> {
        let result = self.network.fetch(request).await;
        self.stats.write().await.record_fetch(result.is_ok());
        result
    }

    /// Writes a copy of a complete successful response; the caller keeps the
    /// original.
    async fn store_dynamic(&self, key: RequestKey, response: &StoredResponse) {
        if !response.is_storable() {
            debug!("Not storing {} with status {}", key, response.status);
            return;
        }

        let dynamic = self.options.generation.dynamic_name();
        match self.storage.put(&dynamic, key.clone(), response.clone()).await {
            Ok(()) => self.stats.write().await.record_write(),
            Err(err) => warn!("Failed to store {} in {}: {}", key, dynamic, err),
        }
    }
}

fn cache_key(request: &AgentRequest) -> Result<RequestKey> {
    RequestKey::for_request(request).ok_or_else(|| {
        AgentError::InvalidRequest(format!("{} {} is not cacheable", request.method, request.url))
    })
}
