// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Child processes with a deadline.

use std::process::Output;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Metadata calls (`head-object`, `describe-images`, ...)
pub const AWS_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Data-file uploads; raw files run to several gigabytes
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(6 * 60 * 60);

#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("failed to run {description}: {source}")]
    Spawn {
        description: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{description} timed out after {}s", timeout.as_secs())]
    Timeout { description: String, timeout: Duration },
}

/// Run `cmd` to completion, capturing stdout and stderr.
///
/// The child is killed if `timeout` elapses first. A non-zero exit status is
/// not an error here; callers inspect `output.status`.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, SubprocessError> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => {
            Err(SubprocessError::Spawn { description: description.to_string(), source })
        }
        Err(_) => {
            tracing::warn!(%description, timeout_secs = timeout.as_secs(), "subprocess timed out");
            Err(SubprocessError::Timeout { description: description.to_string(), timeout })
        }
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
