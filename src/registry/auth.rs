// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Credentials for plugin-initiated status updates.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::Deserialize;
use serde_json::{Map, Value};

const API_KEY_BYTES: usize = 32;

/// Body of a status update reported by a remote plugin.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    /// Checked against `online | offline | error | working` before anything is mutated.
    pub status: String,
    #[serde(default = "chrono::Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub details: Option<Map<String, Value>>,
}

impl StatusUpdate {
    pub fn new(status: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            status: status.to_string(),
            timestamp,
            details: None,
        }
    }

    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = Some(details);
        self
    }
}

pub fn generate_api_key() -> String {
    let mut bytes = [0u8; API_KEY_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Accepts either a bare token or an `Authorization` header value (`Bearer <token>`).
pub fn bearer_token(presented: &str) -> &str {
    let presented = presented.trim();
    match presented.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim(),
        _ => presented,
    }
}

/// Compares without short-circuiting on the first differing byte.
pub(crate) fn token_matches(expected: &str, presented: &str) -> bool {
    let (expected, presented) = (expected.as_bytes(), presented.as_bytes());
    if expected.len() != presented.len() {
        return false;
    }
    expected
        .iter()
        .zip(presented)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token("Bearer abc123"), "abc123");
        assert_eq!(bearer_token("bearer   abc123 "), "abc123");
        assert_eq!(bearer_token("abc123"), "abc123");
    }

    #[test]
    fn test_generated_keys_are_url_safe_and_distinct() {
        let first = generate_api_key();
        let second = generate_api_key();

        assert_eq!(first.len(), 43);
        assert_ne!(first, second);
        assert!(first
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_token_matches() {
        assert!(token_matches("secret", "secret"));
        assert!(!token_matches("secret", "secreT"));
        assert!(!token_matches("secret", "secret2"));
    }
}
