//! Client identity resolution from proxy headers.
//!
//! The resolved address is the rate limiter key and the `IP:` field of audit
//! lines. None of these headers are validated against a trusted proxy chain:
//! any client can set them, so the identity is best-effort and spoofable.

use axum::http::HeaderMap;

/// Address used when no identifying header is present.
pub const FALLBACK_CLIENT_IP: &str = "127.0.0.1";

/// Headers consulted in order; the first usable one wins.
pub const CLIENT_IP_HEADERS: [&str; 4] = [
    "x-forwarded-for",
    "x-real-ip",
    "cf-connecting-ip",
    "true-client-ip",
];

/// Resolve the client identifier for a request.
///
/// `x-forwarded-for` contributes only its first comma-separated segment (the
/// original client by proxy convention). Always returns a non-empty string.
pub fn resolve_client_ip(headers: &HeaderMap) -> String {
    CLIENT_IP_HEADERS
        .iter()
        .find_map(|name| header_candidate(headers, name))
        .unwrap_or_else(|| FALLBACK_CLIENT_IP.to_string())
}

fn header_candidate(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name)?.to_str().ok()?;
    let value = if name == "x-forwarded-for" {
        value.split(',').next().unwrap_or_default()
    } else {
        value
    };
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_forwarded_for_takes_first_segment() {
        let map = headers(&[
            ("x-forwarded-for", "1.2.3.4, 5.6.7.8"),
            ("x-real-ip", "9.9.9.9"),
        ]);
        assert_eq!(resolve_client_ip(&map), "1.2.3.4");
    }

    #[test]
    fn test_precedence_order() {
        let map = headers(&[
            ("true-client-ip", "4.4.4.4"),
            ("cf-connecting-ip", "3.3.3.3"),
            ("x-real-ip", "2.2.2.2"),
        ]);
        assert_eq!(resolve_client_ip(&map), "2.2.2.2");

        let map = headers(&[("true-client-ip", "4.4.4.4"), ("cf-connecting-ip", "3.3.3.3")]);
        assert_eq!(resolve_client_ip(&map), "3.3.3.3");

        let map = headers(&[("true-client-ip", "4.4.4.4")]);
        assert_eq!(resolve_client_ip(&map), "4.4.4.4");
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut map = HeaderMap::new();
        map.insert(
            axum::http::HeaderName::from_bytes(b"X-Real-IP").unwrap(),
            HeaderValue::from_static("8.8.4.4"),
        );
        assert_eq!(resolve_client_ip(&map), "8.8.4.4");
    }

    #[test]
    fn test_fallback_when_absent() {
        assert_eq!(resolve_client_ip(&HeaderMap::new()), FALLBACK_CLIENT_IP);
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let map = headers(&[("x-forwarded-for", " , 5.6.7.8"), ("x-real-ip", "9.9.9.9")]);
        assert_eq!(resolve_client_ip(&map), "9.9.9.9");

        let map = headers(&[("x-real-ip", "")]);
        assert_eq!(resolve_client_ip(&map), FALLBACK_CLIENT_IP);
    }

    #[test]
    fn test_non_ascii_value_is_skipped() {
        let mut map = HeaderMap::new();
        map.insert("x-forwarded-for", HeaderValue::from_bytes(&[0xC3, 0xA9]).unwrap());
        map.insert("cf-connecting-ip", HeaderValue::from_static("6.6.6.6"));
        assert_eq!(resolve_client_ip(&map), "6.6.6.6");
    }
}
