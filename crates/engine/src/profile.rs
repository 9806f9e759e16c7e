// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deployment profile.
//!
//! Everything site-specific (bucket, region, sizing table, worker network
//! and mail settings) lives here, loaded from TOML. Every field has a
//! default, so an empty file is a valid profile.
//!
//! ```toml
//! bucket = "maxquant-jobs"
//! region = "us-west-2"
//!
//! [sizing]
//! volume_multiplier = 4
//! base_padding_gb = 150
//!
//! [worker]
//! smtp_server = "smtp.example.org"
//!
//! [worker.ec2]
//! subnet_id = "subnet-0123"
//! security_group_ids = ["sg-0123"]
//! ```

use crate::locator::DEFAULT_LINK_EXPIRY;
use mq_adapters::Ec2Settings;
use mq_core::{ResultNaming, SizingError, SizingPolicy, Tier, DEFAULT_CREDENTIAL_LENGTH, GB};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const PROFILE_FILE: &str = "profile.toml";

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("cannot read profile {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid profile {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid sizing table: {0}")]
    Sizing(#[from] SizingError),
}

/// Where job folders live and how workers are started
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// S3 bucket + EC2 workers
    #[default]
    Aws,
    /// Directory store + spooled worker requests
    Local,
}

mq_core::simple_display! {
    Backend {
        Aws => "aws",
        Local => "local",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub bucket: String,
    pub region: String,
    pub backend: Backend,
    /// Store root for the local backend
    pub local_root: PathBuf,
    /// Job directory on the worker
    pub remote_job_dir: String,
    /// Object name of the rendered job configuration
    pub config_name: String,
    /// Render the configuration with Windows line endings
    pub crlf: bool,
    pub sizing: SizingSettings,
    pub results: ResultsSettings,
    pub worker: WorkerSettings,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            bucket: "maxquant-jobs".to_string(),
            region: "us-west-2".to_string(),
            backend: Backend::Aws,
            local_root: PathBuf::from("mqsubmit-store"),
            remote_job_dir: r"C:\mq-job\".to_string(),
            config_name: "mqpar.xml".to_string(),
            crlf: true,
            sizing: SizingSettings::default(),
            results: ResultsSettings::default(),
            worker: WorkerSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingSettings {
    /// Ascending by `max_files`
    pub tiers: Vec<Tier>,
    /// Tier for expedited jobs past the last normal tier
    pub expedite: Tier,
    pub volume_multiplier: u64,
    /// Fixed volume headroom, decimal GB
    pub base_padding_gb: u64,
}

impl Default for SizingSettings {
    fn default() -> Self {
        let policy = SizingPolicy::default();
        Self {
            tiers: policy.tiers().to_vec(),
            expedite: policy.expedite_tier().clone(),
            volume_multiplier: policy.volume_multiplier(),
            base_padding_gb: policy.base_padding_bytes() / GB,
        }
    }
}

impl SizingSettings {
    pub fn policy(&self) -> Result<SizingPolicy, SizingError> {
        SizingPolicy::new(
            self.tiers.clone(),
            self.expedite.clone(),
            self.volume_multiplier,
            self.base_padding_gb.saturating_mul(GB),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultsSettings {
    pub prefix: String,
    pub archive_ext: String,
    /// Validity of the results link
    pub expiry_secs: u64,
}

impl Default for ResultsSettings {
    fn default() -> Self {
        let naming = ResultNaming::default();
        Self {
            prefix: naming.prefix,
            archive_ext: naming.archive_ext,
            expiry_secs: DEFAULT_LINK_EXPIRY.as_secs(),
        }
    }
}

impl ResultsSettings {
    pub fn naming(&self) -> ResultNaming {
        ResultNaming { prefix: self.prefix.clone(), archive_ext: self.archive_ext.clone() }
    }

    pub fn expiry(&self) -> Duration {
        Duration::from_secs(self.expiry_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    pub ec2: Ec2Settings,
    /// Extra tags, added after the standard ones
    pub tags: BTreeMap<String, String>,
    pub description: String,
    pub credential_length: usize,
    /// Replaces the bundled PowerShell bootstrap
    pub bootstrap_template: Option<PathBuf>,
    pub smtp_server: String,
    pub mail_from: String,
    /// Spool directory for the local backend (default: `<local_root>/spool`)
    pub spool_dir: Option<PathBuf>,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            ec2: Ec2Settings::default(),
            tags: BTreeMap::new(),
            description: "Maxquant worker node".to_string(),
            credential_length: DEFAULT_CREDENTIAL_LENGTH,
            bootstrap_template: None,
            smtp_server: "localhost".to_string(),
            mail_from: "maxquant-do-not-reply@localhost".to_string(),
            spool_dir: None,
        }
    }
}

impl Profile {
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ProfileError::Read { path: path.to_path_buf(), source })?;
        let profile: Profile = toml::from_str(&text)
            .map_err(|e| ProfileError::Parse { path: path.to_path_buf(), message: e.to_string() })?;
        profile.sizing.policy()?;
        Ok(profile)
    }

    /// Resolve the profile in precedence order: an explicit path, then the
    /// path from the environment, then `<config_dir>/mqsubmit/profile.toml`
    /// if it exists, then built-in defaults.
    ///
    /// Explicit and environment paths must exist. Returns the path used.
    pub fn discover(
        explicit: Option<&Path>,
        from_env: Option<&Path>,
        config_dir: Option<&Path>,
    ) -> Result<(Self, Option<PathBuf>), ProfileError> {
        if let Some(path) = explicit.or(from_env) {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }
        if let Some(path) = config_dir.map(|dir| dir.join("mqsubmit").join(PROFILE_FILE)) {
            if path.is_file() {
                return Ok((Self::load(&path)?, Some(path)));
            }
        }
        Ok((Self::default(), None))
    }

    pub fn spool_dir(&self) -> PathBuf {
        self.worker.spool_dir.clone().unwrap_or_else(|| self.local_root.join("spool"))
    }
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
