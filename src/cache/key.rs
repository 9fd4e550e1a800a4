//! Request Key Module
//!
//! Identity under which a response is stored.

use std::fmt;

use axum::http::Method;
use url::Url;

use crate::net::AgentRequest;

// == Request Key ==
/// Request identity: method plus URL, with the method restricted to GET.
///
/// Fragments are not part of the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey {
    url: String,
}

impl RequestKey {
    /// Key for a GET of `url`.
    pub fn get(url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self { url: url.into() }
    }

    /// Key for `request`, or None when the method is not GET.
    pub fn for_request(request: &AgentRequest) -> Option<Self> {
        (request.method == Method::GET).then(|| Self::get(&request.url))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GET {}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;
    use bytes::Bytes;

    #[test]
    fn test_key_ignores_fragment() {
        let a = RequestKey::get(&Url::parse("http://localhost/logo.png#top").unwrap());
        let b = RequestKey::get(&Url::parse("http://localhost/logo.png").unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_keeps_query() {
        let a = RequestKey::get(&Url::parse("http://localhost/app.js?v=1").unwrap());
        let b = RequestKey::get(&Url::parse("http://localhost/app.js?v=2").unwrap());
        assert_ne!(a, b);
    }

    #[test]
    fn test_no_key_for_non_get() {
        let url = Url::parse("http://localhost/data-endpoint").unwrap();
        let request = AgentRequest::new(Method::POST, url, HeaderMap::new(), Bytes::new());
        assert!(RequestKey::for_request(&request).is_none());
    }

    #[test]
    fn test_display() {
        let key = RequestKey::get(&Url::parse("http://localhost/style.css").unwrap());
        assert_eq!(key.to_string(), "GET http://localhost/style.css");
    }
}
