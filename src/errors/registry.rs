// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::ValidationError;

/// Errors surfaced by [`crate::registry::PluginRegistry`] to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("invalid plugin definition: {0}")]
    Validation(#[from] ValidationError),

    #[error("plugin '{name}' is not registered")]
    NotFound { name: String },

    /// The presented token did not match the plugin's stored API key.
    #[error("status update for plugin '{name}' is not authorized")]
    Unauthorized { name: String },
}
