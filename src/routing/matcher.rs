//! Host matching logic.
//!
//! # Responsibilities
//! - Extract the `Host` header from an inbound request
//! - Match it exactly against a vhost's `host:port` binding
//!
//! # Design Decisions
//! - Host matching is case-insensitive (per HTTP spec); the port part is
//!   numeric and compared exactly
//! - A header without an explicit port matches only a vhost bound to its
//!   protocol's default port
//! - No wildcard or suffix matching; exact keys keep matching O(n) over
//!   small tables and make overlap rejection meaningful

use axum::body::Body;
use axum::http::Request;

use crate::config::schema::Vhost;

/// Compiled matcher for one vhost binding.
#[derive(Debug, Clone)]
pub struct VhostMatcher {
    /// Normalized `host:port`.
    key: String,
    /// Bare host form, accepted when the vhost sits on its protocol's
    /// default port and the header carries no port.
    short: Option<String>,
}

impl VhostMatcher {
    pub fn new(vhost: &Vhost) -> Self {
        let short = if vhost.port == vhost.protocol().default_port() {
            Some(vhost.host.to_lowercase())
        } else {
            None
        };
        Self {
            key: vhost.host_key(),
            short,
        }
    }

    /// Returns true if the given `Host` header value names this vhost.
    pub fn matches(&self, host_header: &str) -> bool {
        let header = host_header.trim().to_lowercase();
        header == self.key || self.short.as_deref() == Some(header.as_str())
    }
}

/// Extract the `Host` header value from a request.
pub fn host_header(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(axum::http::header::HOST)
        .and_then(|value| value.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::VhostConfig;

    fn vhost(yaml: &str) -> Vhost {
        serde_yaml::from_str::<VhostConfig>(yaml)
            .unwrap()
            .resolve()
            .unwrap()
    }

    #[test]
    fn test_exact_match_with_port() {
        let matcher = VhostMatcher::new(&vhost("host: example.com\ntype: http\nport: 8080"));
        assert!(matcher.matches("example.com:8080"));
        assert!(!matcher.matches("example.com"));
        assert!(!matcher.matches("example.com:8081"));
    }

    #[test]
    fn test_default_port_accepts_bare_host() {
        let matcher = VhostMatcher::new(&vhost("host: example.com\ntype: http"));
        assert!(matcher.matches("example.com"));
        assert!(matcher.matches("example.com:80"));
        assert!(!matcher.matches("other.com"));
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let matcher = VhostMatcher::new(&vhost("host: Example.COM\ntype: http"));
        assert!(matcher.matches("EXAMPLE.com"));
        assert!(matcher.matches("example.com:80"));
    }

    #[test]
    fn test_host_header_extraction() {
        let request = Request::builder()
            .header("Host", "example.com:8080")
            .body(Body::default())
            .unwrap();
        assert_eq!(host_header(&request), Some("example.com:8080"));

        let request = Request::builder().body(Body::default()).unwrap();
        assert_eq!(host_header(&request), None);
    }
}
