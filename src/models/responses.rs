//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing admin response bodies.

use serde::Serialize;

use crate::agent::AgentState;
use crate::cache::AgentStats;

/// Response body for GET /__agent/stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub counters: AgentStats,
    /// Cache-first hit rate (0.0 - 1.0)
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse, deriving the hit rate
    pub fn new(counters: AgentStats) -> Self {
        let hit_rate = counters.hit_rate();
        Self { counters, hit_rate }
    }
}

/// One cache store as listed by GET /__agent/caches
#[derive(Debug, Clone, Serialize)]
pub struct CacheInfo {
    pub name: String,
    pub entries: usize,
    /// Belongs to the running generation
    pub current: bool,
}

/// Response body for GET /__agent/caches
#[derive(Debug, Clone, Serialize)]
pub struct CachesResponse {
    pub generation: String,
    pub state: AgentState,
    pub static_cache: String,
    pub dynamic_cache: String,
    pub caches: Vec<CacheInfo>,
}

/// Response body for GET /__agent/health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Whether requests are being intercepted yet
    pub controlling: bool,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(controlling: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            controlling,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
