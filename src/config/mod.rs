// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Settings file loading, environment overrides and validation.

mod settings;

pub use settings::{
    load_settings, BusSettings, LoggingSettings, RegistrySettings, RemoteSettings, Settings,
    StorageSettings, Transport,
};
