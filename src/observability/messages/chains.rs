// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the chain store.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// A chain definition failed validation and was not stored.
///
/// # Log Level
/// `error!`
///
/// # Example
/// ```
/// use morris::errors::ValidationError;
/// use morris::observability::messages::chains::ChainRejected;
///
/// let error = ValidationError::MissingField { field: "trigger" };
/// let msg = ChainRejected {
///     chain_id: "broken_chain",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ChainRejected<'a> {
    pub chain_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ChainRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Invalid chain definition '{}': {}", self.chain_id, self.error)
    }
}

impl StructuredLog for ChainRejected<'_> {
    fn log(&self) {
        tracing::error!(chain_id = self.chain_id, error = %self.error, "{}", self);
    }
}

pub struct ChainsLoaded {
    pub loaded: usize,
    pub rejected: usize,
}

impl Display for ChainsLoaded {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded {} chains ({} rejected)",
            self.loaded, self.rejected
        )
    }
}

impl StructuredLog for ChainsLoaded {
    fn log(&self) {
        tracing::info!(loaded = self.loaded, rejected = self.rejected, "{}", self);
    }
}

pub struct ChainStored<'a> {
    pub chain_id: &'a str,
    pub trigger: &'a str,
}

impl Display for ChainStored<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stored chain '{}' (trigger '{}')", self.chain_id, self.trigger)
    }
}

impl StructuredLog for ChainStored<'_> {
    fn log(&self) {
        tracing::info!(chain_id = self.chain_id, trigger = self.trigger, "{}", self);
    }
}

pub struct ChainRemoved<'a> {
    pub chain_id: &'a str,
}

impl Display for ChainRemoved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Removed chain '{}'", self.chain_id)
    }
}

impl StructuredLog for ChainRemoved<'_> {
    fn log(&self) {
        tracing::info!(chain_id = self.chain_id, "{}", self);
    }
}

/// Two chains share one trigger; only the first in insertion order will ever run.
///
/// # Log Level
/// `warn!`
pub struct DuplicateTrigger<'a> {
    pub trigger: &'a str,
    pub winning_chain: &'a str,
    pub shadowed_chain: &'a str,
}

impl Display for DuplicateTrigger<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Trigger '{}' is already bound to chain '{}'; chain '{}' will not run for it",
            self.trigger, self.winning_chain, self.shadowed_chain
        )
    }
}

impl StructuredLog for DuplicateTrigger<'_> {
    fn log(&self) {
        tracing::warn!(
            trigger = self.trigger,
            winning_chain = self.winning_chain,
            shadowed_chain = self.shadowed_chain,
            "{}", self
        );
    }
}

/// # Log Level
/// `error!` - in-memory chains stay authoritative
pub struct ChainsPersistFailed<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for ChainsPersistFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Could not save chain definitions: {}", self.error)
    }
}

impl StructuredLog for ChainsPersistFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }
}

/// # Log Level
/// `error!` - the store starts empty
pub struct ChainsLoadFailed<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for ChainsLoadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Could not load chain definitions, starting empty: {}", self.error)
    }
}

impl StructuredLog for ChainsLoadFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }
}
