// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed job specification, built once per submission.

use crate::identity::{normalize_contact, JobIdentity, SpecError};
use std::path::{Path, PathBuf};

/// A local file that will be published to the job folder under `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    name: String,
    local: PathBuf,
    size: u64,
}

impl FileRef {
    pub fn new(name: impl Into<String>, local: impl Into<PathBuf>, size: u64) -> Self {
        Self { name: name.into(), local: local.into(), size }
    }

    /// Basename used as the object key inside the job folder
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local(&self) -> &Path {
        &self.local
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Everything the pipeline needs to know about one job.
///
/// Input files are the mass-spec data files; references are the FASTA
/// databases; extras are optional side files (custom `databases.xml` or
/// `modifications.xml`) copied into the job folder verbatim.
#[derive(Debug, Clone)]
pub struct JobSpec {
    identity: JobIdentity,
    contact: String,
    inputs: Vec<FileRef>,
    references: Vec<FileRef>,
    extras: Vec<FileRef>,
}

impl JobSpec {
    pub fn new(
        identity: JobIdentity,
        contact: &str,
        inputs: Vec<FileRef>,
        references: Vec<FileRef>,
    ) -> Result<Self, SpecError> {
        if inputs.is_empty() {
            return Err(SpecError::NoInputs);
        }
        Ok(Self {
            identity,
            contact: normalize_contact(contact)?,
            inputs,
            references,
            extras: Vec::new(),
        })
    }

    pub fn with_extras(mut self, extras: Vec<FileRef>) -> Self {
        self.extras = extras;
        self
    }

    pub fn identity(&self) -> &JobIdentity {
        &self.identity
    }

    pub fn contact(&self) -> &str {
        &self.contact
    }

    pub fn inputs(&self) -> &[FileRef] {
        &self.inputs
    }

    pub fn references(&self) -> &[FileRef] {
        &self.references
    }

    pub fn extras(&self) -> &[FileRef] {
        &self.extras
    }

    /// Total size of the input files; references are not counted.
    pub fn input_bytes(&self) -> u64 {
        self.inputs.iter().map(FileRef::size).sum()
    }

    /// Every file to publish, inputs first, then references, then extras.
    pub fn uploads(&self) -> impl Iterator<Item = &FileRef> {
        self.inputs.iter().chain(&self.references).chain(&self.extras)
    }

    /// `jobinfo.txt` body: `name,department,contact`
    pub fn job_info(&self) -> String {
        format!(
            "{},{},{}",
            self.identity.job_name(),
            self.identity.department(),
            self.contact
        )
    }
}

#[cfg(test)]
#[path = "spec_tests.rs"]
mod tests;
