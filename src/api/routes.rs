//! API Routes
//!
//! Configures the Axum router: admin endpoints plus the catch-all proxy.

use axum::{http::Method, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{caches_handler, health_handler, proxy_handler, stats_handler, AppState};

/// Path prefix reserved for the agent's own endpoints.
pub const ADMIN_PREFIX: &str = "/__agent";

/// Creates the main router.
///
/// # Endpoints
/// - `GET /__agent/health` - Health check
/// - `GET /__agent/stats` - Interception counters
/// - `GET /__agent/caches` - Cache stores and lifecycle state
/// - anything else - proxied through the agent
///
/// # Middleware
/// - CORS: read-only access to the admin endpoints from any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    let admin = Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/caches", get(caches_handler))
        .layer(cors);

    Router::new()
        .nest(ADMIN_PREFIX, admin)
        .fallback(proxy_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;
    use url::Url;

    use crate::agent::{AgentOptions, ShellAgent};
    use crate::api::handlers::SOURCE_HEADER;
    use crate::cache::{CacheGeneration, MemoryStorage, StaticManifest, StoredResponse};
    use crate::net::ScriptedNetwork;

    fn create_test_app(network: Arc<ScriptedNetwork>) -> Router {
        let options = AgentOptions {
            generation: CacheGeneration::new("expense-tracker", "v3").unwrap(),
            manifest: StaticManifest::new(["/"]).unwrap(),
            page_origin: Url::parse("http://localhost:3000").unwrap(),
            bypass_prefixes: Vec::new(),
        };
        let agent = ShellAgent::new(options, Arc::new(MemoryStorage::new()), network);
        create_router(AppState::new(agent))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app(Arc::new(ScriptedNetwork::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/__agent/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = create_test_app(Arc::new(ScriptedNetwork::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/__agent/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unregistered_agent_passes_through() {
        let network = Arc::new(ScriptedNetwork::new());
        network.respond(
            "http://localhost:3000/logo.png",
            StoredResponse::ok("image/png", "png"),
        );
        let app = create_test_app(network);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/logo.png")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[SOURCE_HEADER], "pass-through");
    }

    #[tokio::test]
    async fn test_offline_pass_through_is_bad_gateway() {
        let network = Arc::new(ScriptedNetwork::new());
        network.set_online(false);
        let app = create_test_app(network);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/logo.png")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
