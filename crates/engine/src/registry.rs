// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job registration: one job folder per identity.
//!
//! The rendered configuration object is the registration marker. `exists`
//! is a cheap check made before any upload; `register` claims the identity
//! with a conditional create, so two submitters racing past the check still
//! produce exactly one registration.

use mq_adapters::{ObjectStore, StoreError};
use mq_core::{JobIdentity, JobLayout, JobSpec};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("job '{0}' is already registered")]
    Duplicate(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct JobRegistry<S: ObjectStore> {
    store: S,
    config_name: String,
}

impl<S: ObjectStore> JobRegistry<S> {
    pub fn new(store: S, config_name: impl Into<String>) -> Self {
        Self { store, config_name: config_name.into() }
    }

    pub fn layout(&self, identity: &JobIdentity) -> JobLayout {
        JobLayout::new(identity, self.config_name.clone())
    }

    /// Whether a job folder with this identity is registered.
    ///
    /// Only a definite "not found" answers `false`; any other store failure
    /// is returned so it is never mistaken for absence.
    pub async fn exists(&self, identity: &JobIdentity) -> Result<bool, StoreError> {
        let key = self.layout(identity).config();
        match self.store.head(&key).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Claim the identity with the rendered configuration, then record the
    /// job metadata.
    pub async fn register(&self, spec: &JobSpec, config: &str) -> Result<JobLayout, RegistryError> {
        let layout = self.layout(spec.identity());
        match self.store.put_if_absent(&layout.config(), config.as_bytes().to_vec()).await {
            Ok(()) => {}
            Err(StoreError::AlreadyExists(_)) => {
                return Err(RegistryError::Duplicate(layout.folder().to_string()));
            }
            Err(e) => return Err(e.into()),
        }
        self.store.put(&layout.job_info(), spec.job_info().into_bytes()).await?;
        tracing::info!(job = %layout.folder(), store = %self.store.location(), "registered job");
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
