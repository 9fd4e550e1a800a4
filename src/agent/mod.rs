//! Agent Module
//!
//! The offline caching agent: lifecycle phases and the fetch interceptor,
//! running against injected cache storage and network handles.
//!
//! # Lifecycle
//! `Parsed -> Installing -> Installed -> Activating -> Activated`, or
//! `Redundant` when install fails. Requests are intercepted only while
//! `Activated`.

mod classify;
mod interceptor;
mod lifecycle;


use std::sync::Arc;

use tokio::sync::RwLock;
use url::Url;

use crate::cache::{AgentStats, CacheGeneration, CacheStorage, StaticManifest};
use crate::config::Config;
use crate::error::{AgentError, Result};
use crate::net::Network;

pub use classify::{classify, Policy};
pub use interceptor::{Interception, Served, ServedFrom};
pub use lifecycle::{ActivationReport, AgentState, InstallOutcome};

// == Agent Options ==
/// Deploy-time settings for one agent version.
#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub generation: CacheGeneration,
    pub manifest: StaticManifest,
    /// Origin of the pages this agent controls
    pub page_origin: Url,
    /// Same-origin path prefixes that are never intercepted
    pub bypass_prefixes: Vec<String>,
}

impl AgentOptions {
    /// Builds options from configuration, validating every field.
    pub fn from_config(config: &Config) -> Result<Self> {
        let page_origin = Url::parse(&config.page_origin).map_err(|e| {
            AgentError::InvalidRequest(format!("Invalid page origin {}: {}", config.page_origin, e))
        })?;

        Ok(Self {
            generation: CacheGeneration::new(&config.cache_prefix, &config.generation)?,
            manifest: StaticManifest::new(config.static_manifest.iter().cloned())?,
            page_origin,
            bypass_prefixes: config.bypass_prefixes.clone(),
        })
    }

    /// Both cache names, static first.
    pub fn cache_names(&self) -> Vec<String> {
        vec![
            self.generation.static_name(),
            self.generation.dynamic_name(),
        ]
    }
}

// == Shell Agent ==
/// One deployed version of the caching agent.
pub struct ShellAgent {
    options: AgentOptions,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    state: RwLock<AgentState>,
    stats: RwLock<AgentStats>,
}

impl ShellAgent {
    // == Constructor ==
    pub fn new(
        options: AgentOptions,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
    ) -> Self {
        Self {
            options,
            storage,
            network,
            state: RwLock::new(AgentState::Parsed),
            stats: RwLock::new(AgentStats::new()),
        }
    }

    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    pub async fn state(&self) -> AgentState {
        *self.state.read().await
    }

    /// True once activation has completed and pages are controlled.
    pub async fn is_controlling(&self) -> bool {
        self.state().await == AgentState::Activated
    }

    pub async fn stats(&self) -> AgentStats {
        self.stats.read().await.clone()
    }

    /// Every store name with its entry count.
    pub async fn cache_summary(&self) -> Result<Vec<(String, usize)>> {
        let mut summary = Vec::new();
        for name in self.storage.keys().await? {
            let count = self.storage.entry_count(&name).await?.unwrap_or(0);
            summary.push((name, count));
        }
        Ok(summary)
    }
}
