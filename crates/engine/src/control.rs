// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flag protocol between submitter and worker.
//!
//! A job's stage is whichever flag object exists under its control folder:
//!
//! ```text
//! (none) --mark_ready--> Ready --claim--> Running --finish--> Done
//! ```
//!
//! Each transition deletes the old flag before writing the new one, so an
//! observer may briefly see no flag between two stages but never two flags.

use mq_adapters::{ObjectStore, StoreError};
use mq_core::{ControlFlag, JobLayout};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("job {folder} has conflicting flags: {flags:?}")]
    Conflict { folder: String, flags: Vec<ControlFlag> },

    #[error("job {folder} is {}, expected {}", describe(.found), describe(.expected))]
    Unexpected { folder: String, expected: Option<ControlFlag>, found: Option<ControlFlag> },

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn describe(flag: &Option<ControlFlag>) -> String {
    flag.map_or_else(|| "unflagged".to_string(), |f| f.to_string())
}

/// Point-in-time view of a job folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStatus {
    pub folder: String,
    /// Whether the job configuration object exists
    pub registered: bool,
    pub flag: Option<ControlFlag>,
    /// Objects stored under the job folder, control flags included
    pub objects: usize,
    /// Results link, once the worker has finished
    pub results_url: Option<String>,
}

/// Reads and advances the flags of one job folder.
#[derive(Clone)]
pub struct JobControl<S: ObjectStore> {
    store: S,
    layout: JobLayout,
}

impl<S: ObjectStore> JobControl<S> {
    pub fn new(store: S, layout: JobLayout) -> Self {
        Self { store, layout }
    }

    pub fn layout(&self) -> &JobLayout {
        &self.layout
    }

    /// Current flag, or `None` when no flag object exists
    pub async fn state(&self) -> Result<Option<ControlFlag>, ProtocolError> {
        let mut present = Vec::new();
        for flag in ControlFlag::ALL {
            match self.store.head(&self.layout.flag(flag)).await {
                Ok(_) => present.push(flag),
                Err(StoreError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        match present.as_slice() {
            [] => Ok(None),
            [flag] => Ok(Some(*flag)),
            _ => Err(ProtocolError::Conflict {
                folder: self.layout.folder().to_string(),
                flags: present,
            }),
        }
    }

    /// Submitter: the job is published and a worker is on its way
    pub async fn mark_ready(&self) -> Result<(), ProtocolError> {
        self.advance(ControlFlag::Ready).await
    }

    /// Worker: take ownership of a ready job
    pub async fn claim(&self) -> Result<(), ProtocolError> {
        self.advance(ControlFlag::Running).await
    }

    /// Worker: results are uploaded
    pub async fn finish(&self) -> Result<(), ProtocolError> {
        self.advance(ControlFlag::Done).await
    }

    async fn advance(&self, next: ControlFlag) -> Result<(), ProtocolError> {
        let expected = next.previous();
        let found = self.state().await?;
        if found != expected {
            return Err(ProtocolError::Unexpected {
                folder: self.layout.folder().to_string(),
                expected,
                found,
            });
        }
        if let Some(current) = expected {
            self.store.delete(&self.layout.flag(current)).await?;
        }
        self.store.put(&self.layout.flag(next), next.marker().as_bytes().to_vec()).await?;
        tracing::info!(job = %self.layout.folder(), flag = %next, "flag set");
        Ok(())
    }

    /// Registration, stage, object count and (when done) the results link
    pub async fn status(&self) -> Result<JobStatus, ProtocolError> {
        let registered = match self.store.head(&self.layout.config()).await {
            Ok(_) => true,
            Err(StoreError::NotFound(_)) => false,
            Err(e) => return Err(e.into()),
        };
        let flag = self.state().await?;
        let results_url = if flag.is_some_and(ControlFlag::is_terminal) {
            match self.store.get_text(&self.layout.results_url()).await {
                Ok(url) => Some(url.trim().to_string()),
                Err(StoreError::NotFound(_)) => None,
                Err(e) => return Err(e.into()),
            }
        } else {
            None
        };
        let objects = self.store.list(&self.layout.prefix()).await?.len();
        Ok(JobStatus {
            folder: self.layout.folder().to_string(),
            registered,
            flag,
            objects,
            results_url,
        })
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
