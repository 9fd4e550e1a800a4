//! Error types for the caching agent
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Agent Error Enum ==
/// Unified error type for the caching agent.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Network unreachable, timed out, or the body could not be read
    #[error("Network error: {0}")]
    Network(String),

    /// Network answered with a non-success status where one was required
    #[error("Unexpected status {status} for {url}")]
    BadStatus { url: String, status: u16 },

    /// Neither the network nor any cache store produced a response
    #[error("No response for {0}")]
    NoResponse(String),

    /// Install phase could not pre-cache the static manifest
    #[error("Install failed: {0}")]
    InstallFailed(String),

    /// A cache store could not be deleted
    #[error("Cache deletion failed: {0}")]
    CacheDeletion(String),

    /// Invalid request data or lifecycle transition
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal agent error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for AgentError {
    fn into_response(self) -> Response {
        let status = match &self {
            AgentError::Network(_) | AgentError::NoResponse(_) => StatusCode::BAD_GATEWAY,
            AgentError::BadStatus { .. } => StatusCode::BAD_GATEWAY,
            AgentError::InstallFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            AgentError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AgentError::CacheDeletion(_) | AgentError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        AgentError::Network(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching agent.
pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_errors_map_to_bad_gateway() {
        let response = AgentError::Network("unreachable".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = AgentError::NoResponse("/style.css".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_invalid_request_maps_to_bad_request() {
        let response = AgentError::InvalidRequest("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_bad_status_message() {
        let err = AgentError::BadStatus {
            url: "http://localhost/manifest.webmanifest".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "Unexpected status 404 for http://localhost/manifest.webmanifest"
        );
    }
}
