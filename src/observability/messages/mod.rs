// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! # Organization
//!
//! * `engine` - chain run lifecycle and per-step fail-open events
//! * `plugin` - local and remote plugin dispatch, reply correlation
//! * `registry` - plugin registration, liveness, announce ingestion
//! * `chains` - chain store loading, validation and persistence
//! * `bus` - publish, subscribe and trigger ingestion
//!
//! # Usage Pattern
//!
//! ```rust
//! use morris::observability::messages::engine::ChainRunStarted;
//! use morris::observability::messages::StructuredLog;
//!
//! let msg = ChainRunStarted {
//!     chain_id: "sensor_chain",
//!     trigger: "webhook:sensor",
//!     step_count: 2,
//! };
//!
//! msg.log();
//! let _span = msg.span("run");
//! ```

use std::fmt::Display;
use tracing::Span;

pub mod bus;
pub mod chains;
pub mod engine;
pub mod plugin;
pub mod registry;

/// Emits a message at its documented level with structured fields.
pub trait StructuredLog: Display {
    fn log(&self);

    /// Span covering the work the message describes. Most events are point-in-time
    /// and keep the disabled default.
    fn span(&self, _name: &str) -> Span {
        Span::none()
    }
}
