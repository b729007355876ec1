// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in local plugins.
//!
//! Each plugin is a stateless unit implementing [`crate::traits::Plugin`]; per-step
//! settings arrive as `params` on every call.

pub mod log;
pub mod uppercase;

pub use log::LogPlugin;
pub use uppercase::UppercasePlugin;
