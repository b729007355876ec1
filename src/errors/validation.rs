// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// A chain or plugin definition was malformed. The rejected operation mutates nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The definition is not a JSON object.
    #[error("definition must be an object")]
    NotAnObject,

    /// A required field is absent or empty.
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    /// A field is present but has the wrong shape.
    #[error("field '{field}' must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    /// A chain step has no plugin reference.
    #[error("step {index} does not name a plugin")]
    StepMissingPlugin { index: usize },

    /// Plugin kind outside `{local, remote}`.
    #[error("unknown plugin type '{value}'")]
    InvalidKind { value: String },

    /// Plugin status outside the accepted set.
    #[error("invalid status '{value}', expected one of: {allowed}")]
    InvalidStatus { value: String, allowed: &'static str },

    /// Local plugins are always `active` and never liveness-tracked.
    #[error("plugin '{name}' is local; its status cannot be updated")]
    LocalPluginStatus { name: String },
}
