//! Response models for the agent's admin API
//!
//! This module defines the DTOs serialized into admin response bodies.

pub mod responses;

// Re-export commonly used types
pub use responses::{CacheInfo, CachesResponse, ErrorResponse, HealthResponse, StatsResponse};
