// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Naming of the results bundle a worker uploads when the job finishes.

use crate::layout::JobLayout;
use serde::{Deserialize, Serialize};

/// Bundle naming: `<prefix>-<folder>-results-combined.<archive_ext>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultNaming {
    pub prefix: String,
    pub archive_ext: String,
}

impl Default for ResultNaming {
    fn default() -> Self {
        Self { prefix: "maxquant".to_string(), archive_ext: "zip".to_string() }
    }
}

impl ResultNaming {
    pub fn bundle_name(&self, layout: &JobLayout) -> String {
        format!("{}-{}-results-combined.{}", self.prefix, layout.folder(), self.archive_ext)
    }

    /// Store key of the bundle, inside the job folder
    pub fn bundle_key(&self, layout: &JobLayout) -> String {
        layout.object(&self.bundle_name(layout))
    }
}

/// Where the results will be, and a link that grants read access to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultReference {
    pub key: String,
    pub url: String,
    /// Unix time the link stops working
    pub expires_at: i64,
}

#[cfg(test)]
#[path = "results_tests.rs"]
mod tests;
