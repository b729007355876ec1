// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Plugin dispatch backends.
//!
//! A chain step names either a local plugin or a remote address; the runner routes on the
//! presence of [`crate::chains::REMOTE_SEPARATOR`] alone.
//!
//! ## Local Backend
//! In-process plugins implementing [`crate::traits::Plugin`], resolved from a static
//! [`local::PluginCatalog`] and instantiated once at startup.
//!
//! ## Remote Backend
//! Plugins on other devices, reached over the [`crate::traits::MessageBus`]. Requests go to
//! `plugin/<device>/input`; replies come back on `plugin/<device>/output` and are matched
//! to the waiting call by device.
//!
//! ## Stub Backend (Test-Only)
//! Failing, marking and recording plugins for exercising the runner.
//!
//! # Examples
//!
//! ```rust
//! use morris::backends::local::LocalDispatcher;
//! use serde_json::{json, Map};
//!
//! # tokio_test_block(async {
//! let dispatcher = LocalDispatcher::builtin();
//! let result = dispatcher
//!     .dispatch("Uppercase", json!({"msg": "hello"}), &Map::new())
//!     .await;
//! assert_eq!(result, json!({"msg": "HELLO"}));
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

pub mod local;
pub mod remote;
#[cfg(test)]
pub mod stub;
