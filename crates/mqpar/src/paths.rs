// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path helpers that work on both Windows- and POSIX-style paths.
//!
//! Job configurations are produced on a desktop (usually Windows) and run on
//! a worker with its own layout, so paths are handled as strings rather than
//! `std::path::Path`, which only understands the host's separator.

use std::fmt;

/// Final component of a path written with `\` or `/` separators.
pub fn basename(path: &str) -> &str {
    path.trim().rsplit(['\\', '/']).next().unwrap_or_default()
}

/// Job directory on the worker, always ending in its separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDir(String);

impl RemoteDir {
    /// A directory containing `\` is treated as a Windows path; otherwise `/`
    /// is used as the separator.
    pub fn new(dir: impl Into<String>) -> Self {
        let mut dir = dir.into();
        let sep = if dir.contains('\\') { '\\' } else { '/' };
        if !dir.ends_with(sep) {
            dir.push(sep);
        }
        Self(dir)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Worker-side location of a file published by basename
    pub fn join(&self, name: &str) -> String {
        format!("{}{}", self.0, name)
    }
}

impl Default for RemoteDir {
    fn default() -> Self {
        Self::new("C:\\mq-job\\")
    }
}

impl fmt::Display for RemoteDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
