//! API Module
//!
//! HTTP surface of the agent: a catch-all proxy plus admin endpoints.
//!
//! # Endpoints
//! - `GET /__agent/health` - Health check endpoint
//! - `GET /__agent/stats` - Interception statistics
//! - `GET /__agent/caches` - Cache stores and lifecycle state
//! - `* /*` - Every other request, routed through the agent

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
