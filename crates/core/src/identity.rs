// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identity: the department + job name pair that names a job folder.
//!
//! The folder name doubles as the uniqueness key in the shared store, so
//! both halves are restricted to characters that are safe in an object key
//! and in the tags attached to the worker.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors from building a job identity or job spec
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} '{value}' contains '{ch}'; use letters, digits, '.', '_' or '-'")]
    InvalidChar { field: &'static str, value: String, ch: char },

    #[error("department '{0}' is reserved; choose another department name")]
    ReservedDepartment(String),

    #[error("contact '{0}' is not an email address")]
    InvalidContact(String),

    #[error("job has no input files")]
    NoInputs,
}

/// Department + job name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobIdentity {
    department: String,
    job_name: String,
}

impl JobIdentity {
    /// Build an identity from user input. Whitespace is removed, not rejected.
    pub fn new(department: &str, job_name: &str) -> Result<Self, SpecError> {
        let department = normalize("department", department)?;
        if department.eq_ignore_ascii_case(crate::layout::SOFTWARE_DIR) {
            return Err(SpecError::ReservedDepartment(department));
        }
        Ok(Self { department, job_name: normalize("job name", job_name)? })
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    /// Store folder for this job: `<department>-<job_name>`
    pub fn folder(&self) -> String {
        format!("{}-{}", self.department, self.job_name)
    }
}

impl fmt::Display for JobIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.department, self.job_name)
    }
}

fn strip_whitespace(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

fn normalize(field: &'static str, raw: &str) -> Result<String, SpecError> {
    let value = strip_whitespace(raw);
    if value.is_empty() {
        return Err(SpecError::Empty { field });
    }
    if let Some(ch) =
        value.chars().find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(SpecError::InvalidChar { field, value, ch });
    }
    Ok(value)
}

/// Normalize a contact address: whitespace removed, one `@` with a
/// non-empty local part and domain.
pub fn normalize_contact(raw: &str) -> Result<String, SpecError> {
    let value = strip_whitespace(raw);
    if value.is_empty() {
        return Err(SpecError::Empty { field: "contact" });
    }
    match value.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(value)
        }
        _ => Err(SpecError::InvalidContact(value)),
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
