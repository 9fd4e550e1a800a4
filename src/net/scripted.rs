//! Scripted Network
//!
//! An in-memory network with canned responses, for tests and local demos.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use axum::http::{HeaderMap, StatusCode};
use url::Url;

use crate::cache::StoredResponse;
use crate::error::{AgentError, Result};
use crate::net::{AgentRequest, Network};

// == Scripted Network ==
/// Answers from a URL -> response table and records every call.
///
/// Unknown URLs answer 404. While offline, every fetch fails.
#[derive(Debug)]
pub struct ScriptedNetwork {
    routes: Mutex<HashMap<String, StoredResponse>>,
    unreachable: Mutex<HashSet<String>>,
    online: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl Default for ScriptedNetwork {
    fn default() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            unreachable: Mutex::new(HashSet::new()),
            online: AtomicBool::new(true),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `response` for `url`.
    pub fn respond(&self, url: &str, response: StoredResponse) -> &Self {
        lock(&self.routes).insert(normalize(url), response);
        self
    }

    /// Makes fetches of `url` fail as if the host were unreachable.
    pub fn fail(&self, url: &str) -> &Self {
        lock(&self.unreachable).insert(normalize(url));
        self
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Every call so far, as `"METHOD url"`.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Number of calls made for `url`, any method.
    pub fn calls_to(&self, url: &str) -> usize {
        let url = normalize(url);
        lock(&self.calls)
            .iter()
            .filter(|call| call.split_once(' ').map(|(_, u)| u) == Some(url.as_str()))
            .count()
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &AgentRequest) -> Result<StoredResponse> {
        let url = normalize(request.url.as_str());
        lock(&self.calls).push(format!("{} {}", request.method, url));

        if !self.online.load(Ordering::SeqCst) || lock(&self.unreachable).contains(&url) {
            return Err(AgentError::Network(format!("{} is unreachable", url)));
        }

        Ok(lock(&self.routes)
            .get(&url)
            .cloned()
            .unwrap_or_else(|| StoredResponse::new(StatusCode::NOT_FOUND, HeaderMap::new(), "")))
    }
}

fn normalize(url: &str) -> String {
    Url::parse(url)
        .map(|mut parsed| {
            parsed.set_fragment(None);
            parsed.to_string()
        })
        .unwrap_or_else(|_| url.to_string())
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
