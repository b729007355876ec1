// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for the chain engine, the plugin registry and their collaborators.
//!
//! Registry and chain store operations report their errors to the direct caller.
//! Dispatch, transport and timeout errors never leave the runner: they are logged
//! and the failing step degrades to a pass-through.

mod chain;
mod config;
mod dispatch;
mod persistence;
mod registry;
mod transport;
mod validation;

pub use chain::ChainStoreError;
pub use config::ConfigError;
pub use dispatch::{DispatchError, ProcessingError};
pub use persistence::PersistenceError;
pub use registry::RegistryError;
pub use transport::TransportError;
pub use validation::ValidationError;
