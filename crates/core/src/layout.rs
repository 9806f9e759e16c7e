// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Object keys inside a job folder.

use crate::flag::ControlFlag;
use crate::identity::JobIdentity;

/// Sub-folder holding flags, job metadata and the results link
pub const CONTROL_DIR: &str = "jobCtrl";

/// Bucket folder of installers every worker runs; never a job folder
pub const SOFTWARE_DIR: &str = "software";

/// Prefix matching the installers and nothing else
pub fn software_prefix() -> String {
    format!("{SOFTWARE_DIR}/")
}

/// Key layout for one job folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLayout {
    folder: String,
    config_name: String,
}

impl JobLayout {
    pub fn new(identity: &JobIdentity, config_name: impl Into<String>) -> Self {
        Self { folder: identity.folder(), config_name: config_name.into() }
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Prefix matching every object of the job
    pub fn prefix(&self) -> String {
        format!("{}/", self.folder)
    }

    /// Key for a file published by basename
    pub fn object(&self, name: &str) -> String {
        format!("{}/{}", self.folder, name)
    }

    /// Rendered job configuration; its presence marks the job as registered
    pub fn config(&self) -> String {
        self.object(&self.config_name)
    }

    fn control(&self, name: &str) -> String {
        format!("{}/{}/{}", self.folder, CONTROL_DIR, name)
    }

    pub fn job_info(&self) -> String {
        self.control("jobinfo.txt")
    }

    pub fn results_url(&self) -> String {
        self.control("resultsUrl.txt")
    }

    pub fn flag(&self, flag: ControlFlag) -> String {
        self.control(flag.file_name())
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
