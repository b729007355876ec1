// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic and operational logging in Morris goes through message types in
//! [`messages`]. Each message is a struct implementing `Display` for the human-readable
//! line and [`messages::StructuredLog`] for emission with structured fields, so:
//!
//! * Call sites carry no magic strings
//! * Field names stay consistent across subsystems
//! * Log levels are decided next to the message, not at each call site
//!
//! # Usage
//!
//! ```rust
//! use morris::observability::messages::engine::NoChainForTrigger;
//! use morris::observability::messages::StructuredLog;
//!
//! NoChainForTrigger { trigger: "webhook:unknown" }.log();
//! ```
//!
//! The binary installs a `tracing-subscriber` formatter through [`init_tracing`].

pub mod messages;
mod subscriber;

pub use subscriber::init_tracing;
