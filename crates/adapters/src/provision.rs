// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker provisioning adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Errors from provisioning operations
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("no base image matches '{0}'")]
    NoImage(String),

    #[error("provisioning request failed: {0}")]
    Request(String),

    #[error("unexpected provisioning response: {0}")]
    Response(String),
}

/// Everything needed to start one worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionRequest {
    /// Display name, also emitted as the `Name` tag
    pub name: String,
    pub compute_class: String,
    pub volume_size_gb: u64,
    /// Bootstrap script run once at first boot
    pub user_data: String,
    /// Ordered key/value tags
    pub tags: Vec<(String, String)>,
}

/// A started worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub private_ip: Option<String>,
}

/// Adapter that starts a worker
#[async_trait]
pub trait Provisioner: Clone + Send + Sync + 'static {
    async fn provision(&self, request: &ProvisionRequest) -> Result<Instance, ProvisionError>;
}

/// Provisioner for the `local` backend.
///
/// Writes `<name>.json` (the request without its script) and
/// `<name>.user-data` into a spool directory, where an external launcher
/// picks them up.
#[derive(Debug, Clone)]
pub struct SpoolProvisioner {
    dir: PathBuf,
}

#[derive(Serialize)]
struct SpoolEntry<'a> {
    name: &'a str,
    compute_class: &'a str,
    volume_size_gb: u64,
    user_data: String,
    tags: &'a [(String, String)],
}

impl SpoolProvisioner {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl Provisioner for SpoolProvisioner {
    async fn provision(&self, request: &ProvisionRequest) -> Result<Instance, ProvisionError> {
        let io = |e: std::io::Error| ProvisionError::Request(format!("{}: {e}", self.dir.display()));
        tokio::fs::create_dir_all(&self.dir).await.map_err(io)?;

        let script = self.dir.join(format!("{}.user-data", request.name));
        write_private(&script, request.user_data.as_bytes()).await.map_err(io)?;

        let entry = SpoolEntry {
            name: &request.name,
            compute_class: &request.compute_class,
            volume_size_gb: request.volume_size_gb,
            user_data: script.display().to_string(),
            tags: &request.tags,
        };
        let json = serde_json::to_vec_pretty(&entry)
            .map_err(|e| ProvisionError::Request(format!("cannot encode request: {e}")))?;
        tokio::fs::write(self.dir.join(format!("{}.json", request.name)), json).await.map_err(io)?;

        tracing::info!(name = %request.name, dir = %self.dir.display(), "spooled worker request");
        Ok(Instance { id: format!("spool:{}", request.name), private_ip: None })
    }
}

/// Write a file only its owner can read; bootstrap scripts hold passwords.
async fn write_private(path: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);
    let mut file = options.open(path).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600)).await?;
    }
    file.write_all(body).await?;
    file.flush().await
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{Instance, ProvisionError, ProvisionRequest, Provisioner};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeProvisionerState {
        requests: Vec<ProvisionRequest>,
        failure: Option<String>,
    }

    /// Fake provisioner that records requests
    #[derive(Clone, Default)]
    pub struct FakeProvisioner {
        inner: Arc<Mutex<FakeProvisionerState>>,
    }

    impl FakeProvisioner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every subsequent request fail
        pub fn fail_with(&self, message: &str) {
            self.inner.lock().failure = Some(message.to_string());
        }

        pub fn requests(&self) -> Vec<ProvisionRequest> {
            self.inner.lock().requests.clone()
        }
    }

    #[async_trait]
    impl Provisioner for FakeProvisioner {
        async fn provision(&self, request: &ProvisionRequest) -> Result<Instance, ProvisionError> {
            let mut state = self.inner.lock();
            state.requests.push(request.clone());
            if let Some(message) = &state.failure {
                return Err(ProvisionError::Request(message.clone()));
            }
            let n = state.requests.len();
            Ok(Instance { id: format!("i-fake{n:04}"), private_ip: Some(format!("10.0.0.{n}")) })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeProvisioner;

#[cfg(test)]
#[path = "provision_tests.rs"]
mod tests;
