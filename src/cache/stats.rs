//! Agent Statistics Module
//!
//! Tracks how intercepted requests were served.

use serde::Serialize;

// == Agent Stats ==
/// Counters for intercepted traffic.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentStats {
    /// Cache-first requests answered from a store
    pub hits: u64,
    /// Cache-first requests that had to go to the network
    pub misses: u64,
    /// Network fetches made by the interceptor
    pub network_fetches: u64,
    /// Network fetches that failed outright
    pub network_failures: u64,
    /// Network-first requests answered from the dynamic store
    pub fallbacks: u64,
    /// Requests passed through without touching a store
    pub bypassed: u64,
    /// Responses written to the dynamic store
    pub entries_written: u64,
}

impl AgentStats {
    // == Constructor ==
    /// Creates a new AgentStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache-first hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Records a network fetch and whether it reached the server.
    pub fn record_fetch(&mut self, reached: bool) {
        self.network_fetches += 1;
        if !reached {
            self.network_failures += 1;
        }
    }

    pub fn record_fallback(&mut self) {
        self.fallbacks += 1;
    }

    pub fn record_bypass(&mut self) {
        self.bypassed += 1;
    }

    pub fn record_write(&mut self) {
        self.entries_written += 1;
    }
}
