// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker bootstrap payload.
//!
//! A bootstrap template is a script with `${name}` placeholders. Every
//! substituted value is escaped for the script's quoting rules, so values
//! are only safe inside single-quoted string literals of the template's
//! dialect. A placeholder with no value is an error rather than being left
//! in the output.

use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

/// Regex pattern for ${variable_name}
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*)\}").expect("constant regex pattern is valid")
});

const BUNDLED_WORKER: &str = include_str!("../templates/worker.ps1");

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("bootstrap template references unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("cannot read bootstrap template {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Quoting rules of the script a template is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptDialect {
    /// Values go inside `'...'`; single quotes (including the typographic
    /// ones PowerShell also accepts as delimiters) are doubled.
    PowerShell,
    /// Values go inside `'...'`; `'` becomes `'\''`.
    Posix,
}

mq_core::simple_display! {
    ScriptDialect {
        PowerShell => "powershell",
        Posix => "posix",
    }
}

impl ScriptDialect {
    /// `.ps1` templates are PowerShell; anything else is POSIX shell
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ps1") => ScriptDialect::PowerShell,
            _ => ScriptDialect::Posix,
        }
    }

    /// Escape `value` for a single-quoted string literal
    pub fn escape(self, value: &str) -> String {
        match self {
            ScriptDialect::PowerShell => {
                let mut out = String::with_capacity(value.len());
                for c in value.chars() {
                    if matches!(c, '\'' | '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}') {
                        out.push(c);
                    }
                    out.push(c);
                }
                out
            }
            ScriptDialect::Posix => value.replace('\'', "'\\''"),
        }
    }
}

/// Values injected into the bootstrap script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapVars {
    pub bucket: String,
    pub job_folder: String,
    /// `<job_folder>/`, so listing the job never reaches a sibling folder
    pub job_prefix: String,
    /// Bucket prefix of the installers, slash-terminated
    pub software_prefix: String,
    pub contact: String,
    pub password: String,
    pub config_key: String,
    pub ready_key: String,
    pub running_key: String,
    pub done_key: String,
    pub results_key: String,
    pub results_url_key: String,
    pub remote_job_dir: String,
    pub smtp_server: String,
    pub mail_from: String,
    /// Unix time the results link expires, fixed when it was signed
    pub link_expires: i64,
}

impl BootstrapVars {
    fn to_map(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("bucket", self.bucket.clone()),
            ("job_folder", self.job_folder.clone()),
            ("job_prefix", self.job_prefix.clone()),
            ("software_prefix", self.software_prefix.clone()),
            ("contact", self.contact.clone()),
            ("password", self.password.clone()),
            ("config_key", self.config_key.clone()),
            ("ready_key", self.ready_key.clone()),
            ("running_key", self.running_key.clone()),
            ("done_key", self.done_key.clone()),
            ("results_key", self.results_key.clone()),
            ("results_url_key", self.results_url_key.clone()),
            ("remote_job_dir", self.remote_job_dir.clone()),
            ("smtp_server", self.smtp_server.clone()),
            ("mail_from", self.mail_from.clone()),
            ("link_expires", self.link_expires.to_string()),
        ])
    }
}

/// A bootstrap template and its dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapComposer {
    template: String,
    dialect: ScriptDialect,
}

impl BootstrapComposer {
    pub fn new(template: impl Into<String>, dialect: ScriptDialect) -> Self {
        Self { template: template.into(), dialect }
    }

    /// The PowerShell worker script shipped with mqsubmit
    pub fn bundled() -> Self {
        Self::new(BUNDLED_WORKER, ScriptDialect::PowerShell)
    }

    /// Load a template file; the dialect follows the file extension
    pub fn load(path: &Path) -> Result<Self, BootstrapError> {
        let template = std::fs::read_to_string(path).map_err(|source| BootstrapError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(template, ScriptDialect::for_path(path)))
    }

    pub fn dialect(&self) -> ScriptDialect {
        self.dialect
    }

    /// Render the template, escaping every substituted value.
    pub fn compose(&self, vars: &BootstrapVars) -> Result<String, BootstrapError> {
        let values = vars.to_map();
        if let Some(unknown) = VAR_PATTERN
            .captures_iter(&self.template)
            .map(|caps| caps[1].to_string())
            .find(|name| !values.contains_key(name.as_str()))
        {
            return Err(BootstrapError::UnknownVariable(unknown));
        }

        let script = VAR_PATTERN.replace_all(&self.template, |caps: &regex::Captures| {
            values.get(&caps[1]).map(|v| self.dialect.escape(v)).unwrap_or_default()
        });
        Ok(script.into_owned())
    }
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;
