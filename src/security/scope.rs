//! Which requests are inspected and how they are described in the audit log.
//!
//! The scope reproduces the upstream framework's middleware matcher
//! `/((?!api|_next/static|_next/image|favicon.ico|.*\.).*)`: after the leading
//! slash, a path is skipped when it starts with one of the excluded prefixes or
//! contains a dot anywhere.

use axum::http::Method;
use std::fmt;

const EXCLUDED_PREFIXES: [&str; 4] = ["api", "_next/static", "_next/image", "favicon.ico"];

const STATIC_EXTENSIONS: [&str; 12] = [
    "js", "css", "png", "jpg", "jpeg", "gif", "svg", "ico", "woff", "woff2", "ttf", "eot",
];

/// Returns true when the inspection pipeline applies to `path`.
pub fn is_inspected(path: &str) -> bool {
    let rest = path.strip_prefix('/').unwrap_or(path);
    !(EXCLUDED_PREFIXES.iter().any(|p| rest.starts_with(p)) || rest.contains('.'))
}

/// Action descriptor recorded in an audit line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestAction {
    /// A navigation to an application page.
    PageAccess { path: String },
    /// Anything else, recorded as method and path.
    Request { method: String, path: String },
}

impl RequestAction {
    /// Classify a request. API routes, static assets, the root and framework
    /// internals keep their method; every other path is a page access.
    pub fn classify(method: &Method, path: &str, framework_prefix: &str) -> Self {
        let is_api_route = path.starts_with("/api/");
        let is_static_asset = has_static_extension(path);
        if !is_api_route && !is_static_asset && path != "/" && !path.starts_with(framework_prefix) {
            RequestAction::PageAccess {
                path: path.to_string(),
            }
        } else {
            RequestAction::Request {
                method: method.to_string(),
                path: path.to_string(),
            }
        }
    }
}

impl fmt::Display for RequestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestAction::PageAccess { path } => write!(f, "PAGE_ACCESS: {}", path),
            RequestAction::Request { method, path } => write!(f, "{} {}", method, path),
        }
    }
}

fn has_static_extension(path: &str) -> bool {
    path.rsplit_once('.')
        .map(|(_, ext)| STATIC_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_exclusions() {
        for path in [
            "/api/live-logs",
            "/apiary",
            "/_next/static/chunks/main.js",
            "/_next/image",
            "/favicon.ico",
            "/robots.txt",
            "/docs/v1.2/intro",
        ] {
            assert!(!is_inspected(path), "{} should be skipped", path);
        }
    }

    #[test]
    fn test_scope_inclusions() {
        for path in ["/", "/dashboard", "/search", "/_next/data/build/page", "/login/reset"] {
            assert!(is_inspected(path), "{} should be inspected", path);
        }
    }

    #[test]
    fn test_page_access_classification() {
        let action = RequestAction::classify(&Method::GET, "/dashboard", "/_next");
        assert_eq!(action.to_string(), "PAGE_ACCESS: /dashboard");
    }

    #[test]
    fn test_method_path_classification() {
        let cases = [
            (Method::GET, "/"),
            (Method::POST, "/api/security-reports"),
            (Method::GET, "/assets/app.css"),
            (Method::GET, "/_next/data/x"),
        ];
        for (method, path) in cases {
            let action = RequestAction::classify(&method, path, "/_next");
            assert_eq!(action.to_string(), format!("{} {}", method, path));
        }
    }

    #[test]
    fn test_unknown_extension_is_page_access() {
        let action = RequestAction::classify(&Method::GET, "/report.pdf", "/_next");
        assert!(matches!(action, RequestAction::PageAccess { .. }));
    }
}
