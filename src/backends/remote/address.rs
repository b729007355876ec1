// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::bus::input_topic;
use crate::chains::REMOTE_SEPARATOR;
use crate::errors::DispatchError;

/// A parsed `remote:<device>:<plugin>` step reference.
///
/// Only the second and third segments are read; anything after the plugin is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddress<'a> {
    pub device: &'a str,
    pub plugin: &'a str,
}

impl<'a> RemoteAddress<'a> {
    pub fn parse(address: &'a str) -> Result<Self, DispatchError> {
        let malformed = || DispatchError::MalformedAddress {
            address: address.to_string(),
        };

        let mut parts = address.split(REMOTE_SEPARATOR).skip(1);
        let device = parts.next().filter(|d| is_topic_level(d)).ok_or_else(malformed)?;
        let plugin = parts.next().filter(|p| !p.is_empty()).ok_or_else(malformed)?;

        Ok(Self { device, plugin })
    }

    pub fn input_topic(&self) -> String {
        input_topic(self.device)
    }

    /// Correlation key for replies from this device.
    pub fn reply_key(&self) -> String {
        reply_key(self.device)
    }
}

pub(crate) fn reply_key(device: &str) -> String {
    format!("plugin/{}", device)
}

fn is_topic_level(device: &str) -> bool {
    !device.is_empty() && !device.contains(['/', '+', '#'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_device_and_plugin() {
        let address = RemoteAddress::parse("remote:device1:TempPlugin").unwrap();

        assert_eq!(address.device, "device1");
        assert_eq!(address.plugin, "TempPlugin");
        assert_eq!(address.input_topic(), "plugin/device1/input");
        assert_eq!(address.reply_key(), "plugin/device1");
    }

    #[test]
    fn test_malformed_addresses() {
        for address in ["remote:device1", "remote", "remote::TempPlugin", "remote:dev:", "remote:a/b:P"] {
            assert_eq!(
                RemoteAddress::parse(address),
                Err(DispatchError::MalformedAddress {
                    address: address.to_string()
                }),
                "{}",
                address
            );
        }
    }
}
