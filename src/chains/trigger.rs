// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Builders for namespaced trigger keys. Matching is by exact string equality.

pub struct TriggerKey;

impl TriggerKey {
    pub fn webhook(module: &str) -> String {
        format!("webhook:{}", module)
    }

    pub fn mqtt(topic: &str) -> String {
        format!("mqtt:{}", topic)
    }

    pub fn manual(chain_id: &str) -> String {
        format!("manual:{}", chain_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_keys() {
        assert_eq!(TriggerKey::webhook("sensor"), "webhook:sensor");
        assert_eq!(TriggerKey::mqtt("core/temp"), "mqtt:core/temp");
        assert_eq!(TriggerKey::manual("nightly"), "manual:nightly");
    }
}
