//! Stored Response Module
//!
//! Defines a fully buffered response that can be both stored and returned.

use axum::http::{HeaderMap, HeaderValue, StatusCode};
use bytes::Bytes;
use chrono::{DateTime, Utc};

// == Stored Response ==
/// A response whose body has been read to completion.
///
/// The body is a shared buffer, so cloning the response duplicates the handle
/// and never re-reads the network stream. One clone goes to the cache store,
/// the other to the page.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Response headers, hop-by-hop headers already removed
    pub headers: HeaderMap,
    /// Complete response body
    pub body: Bytes,
    /// When the response was received from the network
    pub fetched_at: DateTime<Utc>,
}

impl StoredResponse {
    // == Constructor ==
    /// Creates a response stamped with the current time.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            fetched_at: Utc::now(),
        }
    }

    /// Shorthand for a 200 response with a content type.
    pub fn ok(content_type: &'static str, body: impl Into<Bytes>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static(content_type),
        );
        Self::new(StatusCode::OK, headers, body)
    }

    /// Returns true for 2xx responses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns true when the response may be stored under its request key.
    ///
    /// `206 Partial Content` holds only a range of the resource, so it never
    /// stands in for a full GET.
    pub fn is_storable(&self) -> bool {
        self.is_success() && self.status != StatusCode::PARTIAL_CONTENT
    }

    /// Age of the response in whole seconds.
    pub fn age_secs(&self) -> i64 {
        (Utc::now() - self.fetched_at).num_seconds().max(0)
    }
}
