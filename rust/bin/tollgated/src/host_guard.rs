//! `Host` header validation.
//!
//! Requests whose `Host` is not in the configured allow-list get a 400
//! before reaching any handler.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use tollgate_core::ServiceError;

/// Hosts accepted in debug mode when no list is configured.
const DEBUG_HOSTS: &[&str] = &["localhost", ".localhost", "127.0.0.1", "[::1]"];

#[derive(Debug, Clone)]
pub struct AllowedHosts {
    patterns: Vec<String>,
}

impl AllowedHosts {
    pub fn new(hosts: &[String], debug: bool) -> Self {
        let patterns = if hosts.is_empty() && debug {
            DEBUG_HOSTS.iter().map(|h| h.to_string()).collect()
        } else {
            hosts.iter().map(|h| h.to_ascii_lowercase()).collect()
        };
        Self { patterns }
    }

    /// Check a raw `Host` header value (port allowed).
    pub fn is_allowed(&self, host: &str) -> bool {
        let Some(domain) = domain_of(host) else {
            return false;
        };
        self.patterns.iter().any(|p| matches_pattern(&domain, p))
    }
}

/// Lowercased domain part of a `Host` value, without port or trailing dot.
fn domain_of(host: &str) -> Option<String> {
    let host = host.trim().to_ascii_lowercase();
    if host.is_empty() {
        return None;
    }

    let domain = if host.starts_with('[') {
        // IPv6 literal keeps its brackets.
        let end = host.find(']')?;
        host[..=end].to_string()
    } else {
        match host.rsplit_once(':') {
            Some((d, port)) if port.chars().all(|c| c.is_ascii_digit()) => d.to_string(),
            Some(_) => return None,
            None => host,
        }
    };

    let domain = domain.strip_suffix('.').unwrap_or(&domain).to_string();
    let valid = !domain.is_empty()
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '[' | ']' | ':'));
    valid.then_some(domain)
}

fn matches_pattern(domain: &str, pattern: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    match pattern.strip_prefix('.') {
        Some(parent) => domain == parent || domain.ends_with(pattern),
        None => domain == pattern,
    }
}

/// Middleware rejecting requests with a missing or disallowed `Host`.
pub async fn host_guard(
    State(hosts): State<Arc<AllowedHosts>>,
    req: Request,
    next: Next,
) -> Response {
    let host = req
        .headers()
        .get("host")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if hosts.is_allowed(&host) {
        return next.run(req).await;
    }

    warn!(host = %host, path = %req.uri().path(), "rejected disallowed host");
    ServiceError::BadRequest(format!("invalid Host header: {:?}", host)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(list: &[&str], debug: bool) -> AllowedHosts {
        let list: Vec<String> = list.iter().map(|h| h.to_string()).collect();
        AllowedHosts::new(&list, debug)
    }

    #[test]
    fn test_exact_match() {
        let h = hosts(&["api.example.com"], false);
        assert!(h.is_allowed("api.example.com"));
        assert!(h.is_allowed("API.Example.com:8443"));
        assert!(h.is_allowed("api.example.com."));
        assert!(!h.is_allowed("www.example.com"));
        assert!(!h.is_allowed("example.com"));
    }

    #[test]
    fn test_subdomain_pattern() {
        let h = hosts(&[".example.com"], false);
        assert!(h.is_allowed("example.com"));
        assert!(h.is_allowed("a.b.example.com"));
        assert!(!h.is_allowed("badexample.com"));
    }

    #[test]
    fn test_wildcard() {
        let h = hosts(&["*"], false);
        assert!(h.is_allowed("anything.test"));
        assert!(!h.is_allowed(""));
    }

    #[test]
    fn test_debug_defaults() {
        let h = hosts(&[], true);
        assert!(h.is_allowed("localhost:8080"));
        assert!(h.is_allowed("app.localhost"));
        assert!(h.is_allowed("127.0.0.1:3000"));
        assert!(h.is_allowed("[::1]:8080"));
        assert!(!h.is_allowed("example.com"));

        // An explicit list wins over the debug defaults.
        let h = hosts(&["api.example.com"], true);
        assert!(!h.is_allowed("localhost"));
    }

    #[test]
    fn test_empty_list_outside_debug_allows_nothing() {
        let h = hosts(&[], false);
        assert!(!h.is_allowed("localhost"));
    }

    #[test]
    fn test_malformed_hosts() {
        let h = hosts(&["*"], false);
        assert!(!h.is_allowed("example.com:port"));
        assert!(!h.is_allowed("exa mple.com"));
        assert!(!h.is_allowed("[::1"));
    }
}
