// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.

use std::path::PathBuf;

/// Profile path override: `MQSUBMIT_PROFILE`
pub fn profile_path() -> Option<PathBuf> {
    std::env::var_os("MQSUBMIT_PROFILE").filter(|s| !s.is_empty()).map(PathBuf::from)
}

/// Log filter directives: `MQSUBMIT_LOG` (same syntax as `RUST_LOG`)
pub fn log_filter() -> Option<String> {
    std::env::var("MQSUBMIT_LOG").ok().filter(|s| !s.is_empty())
}

/// User config directory: XDG_CONFIG_HOME > platform default
pub fn config_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|s| !s.is_empty()) {
        return Some(PathBuf::from(xdg));
    }
    dirs::config_dir()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
