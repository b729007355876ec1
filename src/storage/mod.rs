// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Persistence collaborators for chain definitions and plugin records.
//!
//! Both implement [`crate::traits::Storage`]. The file-backed store overwrites the
//! whole file on every save and makes no crash-atomicity promise.

mod json_file;
mod memory;

pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;
