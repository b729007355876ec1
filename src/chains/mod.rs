// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Chain definitions, their validation and the persistent store.

mod definition;
mod store;
mod trigger;
mod validation;

pub use definition::{ChainDefinition, ChainTable, Step, REMOTE_SEPARATOR};
pub use store::{ChainStore, StoredChains};
pub use trigger::TriggerKey;
pub use validation::validate_definition;
