//! Background Tasks Module
//!
//! Contains background tasks that run alongside the HTTP server.
//!
//! # Tasks
//! - Registration: installs and activates the agent, retrying until it succeeds

mod registration;

pub use registration::spawn_registration_task;
