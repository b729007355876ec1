// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Bus publish/subscribe failures.
///
/// Adapters log these and report a boolean outcome from `publish`; only `subscribe`
/// hands the error back, because a missing subscription is a wiring fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("bus has shut down")]
    Closed,

    #[error("invalid topic '{topic}': {reason}")]
    InvalidTopic { topic: String, reason: &'static str },
}
