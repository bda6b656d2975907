//! Signature-based intrusion heuristics.
//!
//! The request URL (percent-decoded) and the raw `User-Agent` are matched
//! against a fixed, ordered signature list. A hit is observational: it changes
//! the audit status, it does not block the request.

use regex::{Regex, RegexBuilder};
use std::borrow::Cow;

/// Signature definitions: (name, pattern, case-insensitive).
const SIGNATURES: [(&str, &str, bool); 10] = [
    ("script_tag", r"<script", true),
    ("javascript_uri", r"javascript:", true),
    ("onload_handler", r"onload=", true),
    ("onerror_handler", r"onerror=", true),
    ("eval_call", r"eval\(", true),
    ("cookie_access", r"document\.cookie", true),
    ("local_storage", r"localStorage", true),
    ("session_storage", r"sessionStorage", true),
    ("path_traversal", r"\.\.", false),
    ("encoded_traversal", r"%2e%2e", true),
];

/// A compiled signature.
#[derive(Debug, Clone)]
pub struct IntrusionPattern {
    pub name: &'static str,
    regex: Regex,
}

impl IntrusionPattern {
    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

/// Matches requests against the built-in signature list.
#[derive(Debug, Clone)]
pub struct IntrusionDetector {
    patterns: Vec<IntrusionPattern>,
}

impl IntrusionDetector {
    pub fn new() -> Self {
        let patterns = SIGNATURES
            .iter()
            .filter_map(|(name, pattern, case_insensitive)| {
                match RegexBuilder::new(pattern)
                    .case_insensitive(*case_insensitive)
                    .build()
                {
                    Ok(regex) => Some(IntrusionPattern { name, regex }),
                    Err(e) => {
                        tracing::error!(signature = name, error = %e, "Invalid intrusion signature");
                        None
                    }
                }
            })
            .collect();
        Self { patterns }
    }

    /// Signatures in evaluation order.
    pub fn patterns(&self) -> &[IntrusionPattern] {
        &self.patterns
    }

    /// Name of the first signature matching the URL or user agent.
    pub fn detect(&self, url: &str, user_agent: &str) -> Option<&'static str> {
        let decoded = decode_url(url);
        self.patterns
            .iter()
            .find(|p| p.is_match(&decoded) || p.is_match(user_agent))
            .map(|p| p.name)
    }

    pub fn is_intrusion_attempt(&self, url: &str, user_agent: &str) -> bool {
        self.detect(url, user_agent).is_some()
    }
}

impl Default for IntrusionDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Percent-decode a URL, falling back to the raw text when the decoded bytes
/// are not UTF-8.
pub fn decode_url(url: &str) -> Cow<'_, str> {
    match urlencoding::decode(url) {
        Ok(decoded) => decoded,
        Err(_) => Cow::Borrowed(url),
    }
}
