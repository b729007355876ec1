// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process plugins and their dispatcher.

mod catalog;
mod dispatcher;
pub mod plugins;

pub use catalog::{PluginCatalog, PluginFactory};
pub use dispatcher::LocalDispatcher;
