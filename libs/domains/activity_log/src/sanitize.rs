//! String normalization applied before anything reaches storage.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Longest email stored, in characters.
pub const MAX_EMAIL_LEN: usize = 100;

/// Longest user agent stored, in characters.
pub const MAX_USER_AGENT_LEN: usize = 200;

/// Stored when a value is missing.
pub const UNKNOWN: &str = "unknown";

/// Header consulted before the peer address.
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Cut `value` to at most `max` characters without splitting a code point.
fn truncate_chars(value: &str, max: usize) -> &str {
    match value.char_indices().nth(max) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

/// Trim surrounding whitespace, then truncate to [`MAX_EMAIL_LEN`] characters.
pub fn sanitize_email(email: &str) -> String {
    truncate_chars(email.trim(), MAX_EMAIL_LEN).to_string()
}

/// Truncate to [`MAX_USER_AGENT_LEN`] characters, or [`UNKNOWN`] when empty or absent.
pub fn sanitize_user_agent(user_agent: Option<&str>) -> String {
    match user_agent {
        Some(ua) if !ua.is_empty() => truncate_chars(ua, MAX_USER_AGENT_LEN).to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Resolve the client address for attribution.
///
/// The `X-Forwarded-For` value is taken verbatim when present and non-blank,
/// otherwise the peer address is used. The header is not checked against a
/// trusted-proxy list, so a client talking to the service directly can spoof it.
pub fn resolve_client_ip(headers: &HeaderMap, peer_addr: Option<IpAddr>) -> String {
    let forwarded = headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    match (forwarded, peer_addr) {
        (Some(forwarded), _) => forwarded.to_string(),
        (None, Some(peer)) => peer.to_string(),
        (None, None) => UNKNOWN.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::net::Ipv4Addr;

    #[test]
    fn test_sanitize_email_trims() {
        assert_eq!(sanitize_email("  a@b.com  "), "a@b.com");
    }

    #[test]
    fn test_sanitize_email_truncates_to_100() {
        let long = format!("{}@example.com", "x".repeat(138));
        assert_eq!(long.chars().count(), 150);

        let sanitized = sanitize_email(&long);
        assert_eq!(sanitized.chars().count(), 100);
        assert!(long.starts_with(&sanitized));
    }

    #[test]
    fn test_sanitize_email_counts_characters_not_bytes() {
        let long = "é".repeat(120);
        let sanitized = sanitize_email(&long);
        assert_eq!(sanitized.chars().count(), 100);
        assert_eq!(sanitized.len(), 200);
    }

    #[test]
    fn test_sanitize_user_agent_defaults() {
        assert_eq!(sanitize_user_agent(Some("")), "unknown");
        assert_eq!(sanitize_user_agent(None), "unknown");
    }

    #[test]
    fn test_sanitize_user_agent_truncates_to_200() {
        let agent = "a".repeat(250);
        assert_eq!(sanitize_user_agent(Some(&agent)).chars().count(), 200);

        let short = "Mozilla/5.0";
        assert_eq!(sanitize_user_agent(Some(short)), short);
    }

    #[test]
    fn test_resolve_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static("203.0.113.7, 10.0.0.1"));

        let ip = resolve_client_ip(&headers, Some(IpAddr::V4(Ipv4Addr::LOCALHOST)));
        assert_eq!(ip, "203.0.113.7, 10.0.0.1");
    }

    #[test]
    fn test_resolve_client_ip_falls_back_to_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static("   "));

        let ip = resolve_client_ip(&headers, Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1))));
        assert_eq!(ip, "192.0.2.1");
        assert_eq!(resolve_client_ip(&HeaderMap::new(), None), "unknown");
    }
}
