// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::PersistenceError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] PersistenceError),

    #[error("environment override {key}='{value}' is not a valid {expected}")]
    InvalidOverride {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("invalid setting '{field}': {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
