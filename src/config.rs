//! Configuration Module
//!
//! Handles loading and managing agent configuration from environment variables.

use std::env;

/// Generation identifier baked in at build time.
///
/// Set `CACHE_GENERATION` when compiling to stamp a deploy; falls back to the
/// crate version otherwise.
pub const BUILD_GENERATION: &str = match option_env!("CACHE_GENERATION") {
    Some(generation) => generation,
    None => env!("CARGO_PKG_VERSION"),
};

/// Default static manifest, the paths every deploy must serve.
pub const DEFAULT_MANIFEST: &[&str] = &["/", "/index.html", "/manifest.webmanifest"];

/// Agent configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Origin that serves the application shell
    pub upstream_url: String,
    /// Origin of the pages the agent controls
    pub page_origin: String,
    /// Prefix shared by every cache store name
    pub cache_prefix: String,
    /// Generation identifier embedded in both cache names
    pub generation: String,
    /// Paths pre-cached during install
    pub static_manifest: Vec<String>,
    /// Same-origin path prefixes that are never intercepted
    pub bypass_prefixes: Vec<String>,
    /// Network timeout in seconds, 0 disables it
    pub fetch_timeout: u64,
    /// Seconds between registration attempts after a failure
    pub registration_retry: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `UPSTREAM_URL` - Shell origin (default: http://127.0.0.1:5173)
    /// - `PAGE_ORIGIN` - Controlled page origin (default: http://localhost:3000)
    /// - `CACHE_PREFIX` - Cache name prefix (default: expense-tracker)
    /// - `CACHE_GENERATION` - Generation identifier (default: build generation)
    /// - `STATIC_MANIFEST` - Comma-separated manifest paths
    /// - `BYPASS_PREFIXES` - Comma-separated path prefixes (default: none)
    /// - `FETCH_TIMEOUT_SECS` - Network timeout (default: 0, disabled)
    /// - `REGISTRATION_RETRY_SECS` - Registration retry interval (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            upstream_url: env::var("UPSTREAM_URL").unwrap_or(defaults.upstream_url),
            page_origin: env::var("PAGE_ORIGIN").unwrap_or(defaults.page_origin),
            cache_prefix: env::var("CACHE_PREFIX").unwrap_or(defaults.cache_prefix),
            generation: env::var("CACHE_GENERATION")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.generation),
            static_manifest: env::var("STATIC_MANIFEST")
                .ok()
                .map(|v| split_list(&v))
                .filter(|paths| !paths.is_empty())
                .unwrap_or(defaults.static_manifest),
            bypass_prefixes: env::var("BYPASS_PREFIXES")
                .ok()
                .map(|v| split_list(&v))
                .unwrap_or(defaults.bypass_prefixes),
            fetch_timeout: env::var("FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.fetch_timeout),
            registration_retry: env::var("REGISTRATION_RETRY_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.registration_retry),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            upstream_url: "http://127.0.0.1:5173".to_string(),
            page_origin: "http://localhost:3000".to_string(),
            cache_prefix: "expense-tracker".to_string(),
            generation: BUILD_GENERATION.to_string(),
            static_manifest: DEFAULT_MANIFEST.iter().map(|p| p.to_string()).collect(),
            bypass_prefixes: Vec::new(),
            fetch_timeout: 0,
            registration_retry: 30,
        }
    }
}

/// Splits a comma-separated list, dropping blank items.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
