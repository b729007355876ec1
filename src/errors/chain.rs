// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::ValidationError;

/// Errors surfaced by [`crate::chains::ChainStore`] to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainStoreError {
    #[error("invalid chain '{chain_id}': {source}")]
    Validation {
        chain_id: String,
        #[source]
        source: ValidationError,
    },

    #[error("chain '{chain_id}' does not exist")]
    NotFound { chain_id: String },
}
