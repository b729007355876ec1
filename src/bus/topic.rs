// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Topic names and subscription patterns.
//!
//! Levels are separated by `/`. In a pattern, `+` matches exactly one level and `#`
//! matches the remaining levels (including none); `#` is only allowed as the last level.

use crate::errors::TransportError;

const SINGLE_LEVEL: &str = "+";
const MULTI_LEVEL: &str = "#";

/// Checks a concrete topic used for publishing.
pub fn validate_topic(topic: &str) -> Result<(), TransportError> {
    if topic.is_empty() {
        return Err(invalid(topic, "topic is empty"));
    }
    if topic.contains(['+', '#']) {
        return Err(invalid(topic, "wildcards are not allowed when publishing"));
    }
    Ok(())
}

/// Checks a subscription pattern.
pub fn validate_pattern(pattern: &str) -> Result<(), TransportError> {
    if pattern.is_empty() {
        return Err(invalid(pattern, "pattern is empty"));
    }

    let levels: Vec<&str> = pattern.split('/').collect();
    for (index, level) in levels.iter().enumerate() {
        if *level == MULTI_LEVEL {
            if index + 1 != levels.len() {
                return Err(invalid(pattern, "'#' must be the last level"));
            }
        } else if *level != SINGLE_LEVEL && level.contains(['+', '#']) {
            return Err(invalid(pattern, "wildcards must occupy a whole level"));
        }
    }
    Ok(())
}

/// Returns true when `topic` is selected by `pattern`. Both are assumed valid.
pub fn matches(pattern: &str, topic: &str) -> bool {
    let mut pattern_levels = pattern.split('/');
    let mut topic_levels = topic.split('/');

    loop {
        match (pattern_levels.next(), topic_levels.next()) {
            (Some(MULTI_LEVEL), _) => return true,
            (Some(SINGLE_LEVEL), Some(_)) => {}
            (Some(expected), Some(actual)) if expected == actual => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}

/// Extracts `<device>` from `plugin/<device>/<suffix>`.
pub fn device_segment<'a>(topic: &'a str, suffix: &str) -> Option<&'a str> {
    let mut levels = topic.split('/');
    match (levels.next(), levels.next(), levels.next(), levels.next()) {
        (Some("plugin"), Some(device), Some(last), None) if last == suffix && !device.is_empty() => {
            Some(device)
        }
        _ => None,
    }
}

fn invalid(topic: &str, reason: &'static str) -> TransportError {
    TransportError::InvalidTopic {
        topic: topic.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_single_level_matches() {
        assert!(matches("plugin/announce", "plugin/announce"));
        assert!(matches("plugin/+/output", "plugin/device1/output"));
        assert!(!matches("plugin/+/output", "plugin/device1/input"));
        assert!(!matches("plugin/+/output", "plugin/a/b/output"));
        assert!(!matches("plugin/announce", "plugin/announce/extra"));
    }

    #[test]
    fn test_multi_level_matches() {
        assert!(matches("core/#", "core/sensors/temp"));
        assert!(matches("core/#", "core"));
        assert!(matches("#", "anything/at/all"));
        assert!(!matches("core/#", "plugin/announce"));
    }

    #[test]
    fn test_pattern_validation() {
        let cases = [
            ("plugin/+/output", true),
            ("core/#", true),
            ("#", true),
            ("core/#/more", false),
            ("core/sensor+", false),
            ("", false),
        ];
        for (pattern, ok) in cases {
            assert_eq!(validate_pattern(pattern).is_ok(), ok, "pattern {:?}", pattern);
        }
    }

    #[test]
    fn test_publish_topic_rejects_wildcards() {
        assert!(validate_topic("plugin/device1/input").is_ok());
        assert!(matches!(
            validate_topic("plugin/+/input"),
            Err(TransportError::InvalidTopic { .. })
        ));
        assert!(validate_topic("").is_err());
    }

    #[test]
    fn test_device_segment() {
        assert_eq!(device_segment("plugin/device1/output", "output"), Some("device1"));
        assert_eq!(device_segment("plugin/device1/input", "output"), None);
        assert_eq!(device_segment("plugin//output", "output"), None);
        assert_eq!(device_segment("plugin/announce", "output"), None);
    }
}
