//! Agent Lifecycle
//!
//! Install pre-caches the static manifest; activate removes stores left by
//! earlier generations.

use futures::future::{join_all, try_join_all};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::agent::ShellAgent;
use crate::cache::RequestKey;
use crate::error::{AgentError, Result};
use crate::net::AgentRequest;

// == Agent State ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    Parsed,
    Installing,
    /// Installed and allowed to skip waiting
    Installed,
    Activating,
    /// Controlling every in-scope page
    Activated,
    /// Install failed; registration may be retried
    Redundant,
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub cache_name: String,
    pub cached: usize,
    /// Activation may start without waiting for open pages to close
    pub skip_waiting: bool,
}

/// Result of an activate phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
    /// Every open in-scope page is now controlled
    pub clients_claimed: bool,
}

impl ShellAgent {
    // == Install ==
    /// Opens the static store and fills it with every manifest path.
    ///
    /// All-or-nothing: a single failed or unstorable fetch leaves the store
    /// untouched, marks the agent redundant and fails the install.
    pub async fn install(&self) -> Result<InstallOutcome> {
        {
            let mut state = self.state.write().await;
            match *state {
                AgentState::Parsed | AgentState::Redundant => *state = AgentState::Installing,
                other => {
                    return Err(AgentError::InvalidRequest(format!(
                        "Cannot install from state {:?}",
                        other
                    )))
                }
            }
        }

        let cache_name = self.options.generation.static_name();
        info!("Installing generation {}", self.options.generation.id());

        match self.precache(&cache_name).await {
            Ok(cached) => {
                *self.state.write().await = AgentState::Installed;
                info!("Pre-cached {} manifest entries into {}", cached, cache_name);
                Ok(InstallOutcome {
                    cache_name,
                    cached,
                    skip_waiting: true,
                })
            }
            Err(err) => {
                *self.state.write().await = AgentState::Redundant;
                warn!("Install of {} failed: {}", cache_name, err);
                Err(AgentError::InstallFailed(err.to_string()))
            }
        }
    }

    async fn precache(&self, cache_name: &str) -> Result<usize> {
        self.storage.open(cache_name).await?;

        let fetches = self.options.manifest.paths().iter().map(|path| async move {
            let url = self.options.page_origin.join(path).map_err(|e| {
                AgentError::InvalidRequest(format!("Invalid manifest path {}: {}", path, e))
            })?;
            let request = AgentRequest::get(url);
            let response = self.network.fetch(&request).await?;

            if !response.is_storable() {
                return Err(AgentError::BadStatus {
                    url: request.url.to_string(),
                    status: response.status.as_u16(),
                });
            }
            debug!("Fetched manifest entry {}", request.url);
            Ok::<_, AgentError>((RequestKey::get(&request.url), response))
        });

        // Nothing is written until every fetch has succeeded.
        let entries = try_join_all(fetches).await?;
        let cached = entries.len();
        self.storage.put_all(cache_name, entries).await?;
        Ok(cached)
    }

    // == Activate ==
    /// Deletes every store that is neither the current static nor the current
    /// dynamic store, then claims all pages.
    ///
    /// Deletions run independently; a failed one is logged and never blocks
    /// the rest.
    pub async fn activate(&self) -> Result<ActivationReport> {
        {
            let mut state = self.state.write().await;
            if *state != AgentState::Installed {
                return Err(AgentError::InvalidRequest(format!(
                    "Cannot activate from state {:?}",
                    *state
                )));
            }
            *state = AgentState::Activating;
        }

        let names = match self.storage.keys().await {
            Ok(names) => names,
            Err(err) => {
                warn!("Could not enumerate caches, skipping cleanup: {}", err);
                Vec::new()
            }
        };

        let stale: Vec<String> = names
            .into_iter()
            .filter(|name| !self.options.generation.owns(name))
            .collect();

        let outcomes = join_all(stale.into_iter().map(|name| async move {
            let outcome = self.storage.delete(&name).await;
            (name, outcome)
        }))
        .await;

        let mut report = ActivationReport::default();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(_) => {
                    debug!("Deleted stale cache {}", name);
                    report.deleted.push(name);
                }
                Err(err) => {
                    warn!("Failed to delete stale cache {}: {}", name, err);
                    report.failed.push(name);
                }
            }
        }

        *self.state.write().await = AgentState::Activated;
        report.clients_claimed = true;
        info!(
            "Generation {} active: {} stale caches deleted, {} failed",
            self.options.generation.id(),
            report.deleted.len(),
            report.failed.len()
        );

        Ok(report)
    }

    // == Register ==
    /// Installs, then activates straight away since install skips waiting.
    pub async fn register(&self) -> Result<ActivationReport> {
        let outcome = self.install().await?;
        if !outcome.skip_waiting {
            return Err(AgentError::Internal(
                "Installed agent is waiting for pages to close".to_string(),
            ));
        }
        self.activate().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use url::Url;

    use crate::agent::AgentOptions;
    use crate::cache::{
        CacheGeneration, CacheStorage, MemoryStorage, StaticManifest, StoredResponse,
    };
    use crate::net::ScriptedNetwork;

    const ORIGIN: &str = "http://localhost:3000";

    fn options(manifest: &[&str]) -> AgentOptions {
        AgentOptions {
            generation: CacheGeneration::new("expense-tracker", "v3").unwrap(),
            manifest: StaticManifest::new(manifest.iter().copied()).unwrap(),
            page_origin: Url::parse(ORIGIN).unwrap(),
            bypass_prefixes: Vec::new(),
        }
    }

    fn url(path: &str) -> String {
        format!("{}{}", ORIGIN, path)
    }

    /// Storage that refuses to delete one named store.
    struct StickyStorage {
        inner: MemoryStorage,
        sticky: String,
    }

    #[async_trait]
    impl CacheStorage for StickyStorage {
        async fn open(&self, name: &str) -> Result<()> {
            self.inner.open(name).await
        }
        async fn put(&self, name: &str, key: RequestKey, response: StoredResponse) -> Result<()> {
            self.inner.put(name, key, response).await
        }
        async fn put_all(
            &self,
            name: &str,
            entries: Vec<(RequestKey, StoredResponse)>,
        ) -> Result<()> {
            self.inner.put_all(name, entries).await
        }
        async fn match_in(&self, name: &str, key: &RequestKey) -> Result<Option<StoredResponse>> {
            self.inner.match_in(name, key).await
        }
        async fn keys(&self) -> Result<Vec<String>> {
            self.inner.keys().await
        }
        async fn delete(&self, name: &str) -> Result<bool> {
            if name == self.sticky {
                return Err(AgentError::CacheDeletion(name.to_string()));
            }
            self.inner.delete(name).await
        }
        async fn entry_count(&self, name: &str) -> Result<Option<usize>> {
            self.inner.entry_count(name).await
        }
    }

    #[tokio::test]
    async fn test_install_precaches_manifest() {
        let network = Arc::new(ScriptedNetwork::new());
        network.respond(&url("/"), StoredResponse::ok("text/html", "<html>"));
        network.respond(&url("/manifest.webmanifest"), StoredResponse::ok("application/manifest+json", "{}"));
        let storage = Arc::new(MemoryStorage::new());
        let agent = ShellAgent::new(
            options(&["/", "/manifest.webmanifest"]),
            storage.clone(),
            network,
        );

        let outcome = agent.install().await.unwrap();

        assert_eq!(outcome.cache_name, "expense-tracker-static-v3");
        assert_eq!(outcome.cached, 2);
        assert!(outcome.skip_waiting);
        assert_eq!(agent.state().await, AgentState::Installed);
        assert_eq!(
            storage.entry_count("expense-tracker-static-v3").await.unwrap(),
            Some(2)
        );
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let network = Arc::new(ScriptedNetwork::new());
        network.respond(&url("/"), StoredResponse::ok("text/html", "<html>"));
        network.fail(&url("/manifest.webmanifest"));
        let storage = Arc::new(MemoryStorage::new());
        let agent = ShellAgent::new(
            options(&["/", "/manifest.webmanifest"]),
            storage.clone(),
            network,
        );

        let result = agent.install().await;

        assert!(matches!(result, Err(AgentError::InstallFailed(_))));
        assert_eq!(agent.state().await, AgentState::Redundant);
        assert_eq!(
            storage.entry_count("expense-tracker-static-v3").await.unwrap(),
            Some(0)
        );
    }

    #[tokio::test]
    async fn test_install_fails_on_missing_asset() {
        let network = Arc::new(ScriptedNetwork::new());
        network.respond(&url("/"), StoredResponse::ok("text/html", "<html>"));
        let agent = ShellAgent::new(
            options(&["/", "/icons/icon-192.png"]),
            Arc::new(MemoryStorage::new()),
            network,
        );

        let result = agent.install().await;
        assert!(matches!(result, Err(AgentError::InstallFailed(msg)) if msg.contains("404")));
    }

    #[tokio::test]
    async fn test_install_can_be_retried_after_failure() {
        let network = Arc::new(ScriptedNetwork::new());
        network.respond(&url("/"), StoredResponse::ok("text/html", "<html>"));
        network.set_online(false);
        let agent = ShellAgent::new(options(&["/"]), Arc::new(MemoryStorage::new()), network.clone());

        assert!(agent.install().await.is_err());

        network.set_online(true);
        assert!(agent.install().await.is_ok());
        assert!(matches!(
            agent.install().await,
            Err(AgentError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_activate_requires_install() {
        let agent = ShellAgent::new(
            options(&["/"]),
            Arc::new(MemoryStorage::new()),
            Arc::new(ScriptedNetwork::new()),
        );

        assert!(matches!(
            agent.activate().await,
            Err(AgentError::InvalidRequest(_))
        ));
        assert_eq!(agent.state().await, AgentState::Parsed);
    }

    #[tokio::test]
    async fn test_activate_deletes_other_generations() {
        let network = Arc::new(ScriptedNetwork::new());
        network.respond(&url("/"), StoredResponse::ok("text/html", "<html>"));
        let storage = Arc::new(MemoryStorage::new());
        storage.open("expense-tracker-v2").await.unwrap();
        storage.open("expense-tracker-static-v2").await.unwrap();
        storage.open("expense-tracker-dynamic-v3").await.unwrap();
        let agent = ShellAgent::new(options(&["/"]), storage.clone(), network);

        let report = agent.register().await.unwrap();

        assert_eq!(
            report.deleted,
            vec!["expense-tracker-static-v2", "expense-tracker-v2"]
        );
        assert!(report.failed.is_empty());
        assert!(report.clients_claimed);
        assert_eq!(
            storage.keys().await.unwrap(),
            vec!["expense-tracker-dynamic-v3", "expense-tracker-static-v3"]
        );
        assert!(agent.is_controlling().await);
    }

    #[tokio::test]
    async fn test_activate_continues_past_failed_deletion() {
        let network = Arc::new(ScriptedNetwork::new());
        network.respond(&url("/"), StoredResponse::ok("text/html", "<html>"));
        let storage = Arc::new(StickyStorage {
            inner: MemoryStorage::new(),
            sticky: "old-a".to_string(),
        });
        storage.open("old-a").await.unwrap();
        storage.open("old-b").await.unwrap();
        storage.open("old-c").await.unwrap();
        let agent = ShellAgent::new(options(&["/"]), storage.clone(), network);

        let report = agent.register().await.unwrap();

        assert_eq!(report.failed, vec!["old-a"]);
        assert_eq!(report.deleted, vec!["old-b", "old-c"]);
        assert_eq!(agent.state().await, AgentState::Activated);
    }
}
