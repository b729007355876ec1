// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Chain execution.

pub mod runner;

pub use runner::{ChainRunner, RunnerOptions};
