// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // local and remote plugin dispatch
pub mod bus;        // topic routing, in-memory bus, bus triggers
pub mod chains;     // chain definitions + store
pub mod config;     // settings
pub mod engine;     // chain runner
pub mod errors;     // error handling
pub mod observability;
pub mod registry;   // plugin identity, liveness, auth
pub mod runtime;    // assembly
pub mod storage;    // persistence collaborators
pub mod traits;     // seams
