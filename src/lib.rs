//! Shell Cache - An offline caching agent for a web application shell
//!
//! Intercepts the shell's same-origin GET requests and serves them
//! network-first (documents, scripts, styles) or cache-first (everything
//! else) from generation-versioned cache stores.

pub mod agent;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod net;
pub mod tasks;

pub use agent::ShellAgent;
pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_registration_task;
