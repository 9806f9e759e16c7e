// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Submission pipeline.
//!
//! One sequential pass per job:
//!
//! 1. Validate: identity, configuration, local files, sizing. Nothing remote
//!    is touched until this succeeds.
//! 2. Check the registry, then claim the identity with the rendered
//!    configuration.
//! 3. Publish inputs, references and side files; persist the results link.
//! 4. Compose the worker bootstrap and provision the worker.
//! 5. Mark the job Ready.
//!
//! Failures after step 2 are not unwound. A failed provision leaves the job
//! folder without a Ready flag, which is logged.

use crate::bootstrap::{BootstrapComposer, BootstrapError, BootstrapVars};
use crate::control::{JobControl, ProtocolError};
use crate::inventory::{self, InventoryError};
use crate::locator::ResultLocator;
use crate::profile::Profile;
use crate::registry::{JobRegistry, RegistryError};
use mq_adapters::{
    Instance, ObjectStore, PresignError, Presigner, ProvisionError, ProvisionRequest,
    Provisioner, StoreError,
};
use mq_core::{
    software_prefix, Credential, CredentialGenerator, JobIdentity, JobLayout, JobSpec,
    ResultReference, SizingDecision, SizingError, SizingPolicy, SpecError,
};
use mq_mqpar::{ConfigError, LineEnding, MqparDocument, RemoteDir};
use std::path::PathBuf;
use thiserror::Error;


#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("cannot read job configuration {}: {source}", path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error("the following files were not found in the job directory:{}", list_paths(.0))]
    MissingFiles(Vec<PathBuf>),

    #[error("cannot inspect {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("there is already a job named '{0}'; choose a different job name and try again")]
    DuplicateJob(String),

    #[error("invalid sizing table: {0}")]
    Sizing(#[from] SizingError),

    #[error("object store error: {0}")]
    Store(#[from] StoreError),

    #[error("cannot create results link: {0}")]
    Presign(#[from] PresignError),

    #[error("cannot compose worker bootstrap: {0}")]
    Bootstrap(#[from] BootstrapError),

    #[error("cannot start worker: {0}")]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl From<RegistryError> for SubmitError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Duplicate(folder) => Self::DuplicateJob(folder),
            RegistryError::Store(e) => Self::Store(e),
        }
    }
}

impl From<InventoryError> for SubmitError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::Missing(paths) => Self::MissingFiles(paths),
            InventoryError::Io { path, source } => Self::Io { path, source },
        }
    }
}

fn list_paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| format!("\n\t{}", p.display())).collect()
}

/// What the user asked for.
#[derive(Debug, Clone, Default)]
pub struct SubmitRequest {
    pub config_path: PathBuf,
    pub job_name: String,
    pub department: String,
    pub contact: String,
    pub expedite: bool,
}

impl SubmitRequest {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self { config_path: config_path.into(), ..Default::default() }
    }

    mq_core::setters! {
        into {
            job_name: String,
            department: String,
            contact: String,
        }
        set {
            expedite: bool,
        }
    }
}

/// Outcome of a successful submission.
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub identity: JobIdentity,
    pub layout: JobLayout,
    pub contact: String,
    pub sizing: SizingDecision,
    pub instance: Instance,
    pub results: ResultReference,
    /// Worker login secret; shown to the user at most once
    pub credential: Credential,
    /// Every object published for the job, in upload order
    pub uploaded: Vec<String>,
}

pub struct SubmissionOrchestrator<S: ObjectStore, P: Provisioner, R: Presigner> {
    store: S,
    provisioner: P,
    registry: JobRegistry<S>,
    locator: ResultLocator<R>,
    composer: BootstrapComposer,
    credentials: CredentialGenerator,
    policy: SizingPolicy,
    profile: Profile,
}

impl<S: ObjectStore, P: Provisioner, R: Presigner> SubmissionOrchestrator<S, P, R> {
    /// Wire the pipeline for a profile. The sizing table and any bootstrap
    /// override are validated here, before a job is looked at.
    pub fn new(store: S, provisioner: P, presigner: R, profile: Profile) -> Result<Self, SubmitError> {
        let policy = profile.sizing.policy()?;
        let composer = match &profile.worker.bootstrap_template {
            Some(path) => BootstrapComposer::load(path)?,
            None => BootstrapComposer::bundled(),
        };
        let locator = ResultLocator::new(
            presigner,
            profile.results.naming(),
            profile.results.expiry(),
            &profile.config_name,
        );
        Ok(Self {
            registry: JobRegistry::new(store.clone(), profile.config_name.clone()),
            store,
            provisioner,
            locator,
            composer,
            credentials: CredentialGenerator::new(profile.worker.credential_length),
            policy,
            profile,
        })
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub async fn submit(&self, request: &SubmitRequest) -> Result<SubmissionReceipt, SubmitError> {
        let identity = JobIdentity::new(&request.department, &request.job_name)?;

        let bytes = tokio::fs::read(&request.config_path).await.map_err(|source| {
            SubmitError::ReadConfig { path: request.config_path.clone(), source }
        })?;
        let mut document = MqparDocument::from_bytes(&bytes)?;
        let files = document.rewrite_paths(&RemoteDir::new(self.profile.remote_job_dir.as_str()))?;

        let resolved = inventory::resolve(&inventory::job_dir(&request.config_path), &files).await?;
        let spec = JobSpec::new(identity, &request.contact, resolved.inputs, resolved.references)?
            .with_extras(resolved.extras);

        let sizing = self.policy.decide(spec.inputs().len(), spec.input_bytes(), request.expedite);
        document.set_threads(sizing.threads)?;
        let line_ending = if self.profile.crlf { LineEnding::Crlf } else { LineEnding::Lf };
        let config = document.render(line_ending)?;
        tracing::info!(
            job = %spec.identity(),
            compute_class = %sizing.compute_class,
            threads = sizing.threads,
            volume_gb = sizing.volume_size_gb(),
            "sized job"
        );

        if self.registry.exists(spec.identity()).await? {
            return Err(SubmitError::DuplicateJob(spec.identity().folder()));
        }
        let layout = self.registry.register(&spec, &config).await?;

        let uploaded = self.publish(&spec, &layout).await?;

        let results = self.locator.locate(spec.identity())?;
        self.store.put(&layout.results_url(), results.url.clone().into_bytes()).await?;

        let credential = self.credentials.generate();
        let vars = self.bootstrap_vars(&spec, &layout, &results, &credential);
        let user_data = self.composer.compose(&vars)?;

        let provision = ProvisionRequest {
            name: format!("maxquant-{}", layout.folder()),
            compute_class: sizing.compute_class.clone(),
            volume_size_gb: sizing.volume_size_gb(),
            user_data,
            tags: self.tags(&spec, &layout),
        };
        let instance = match self.provisioner.provision(&provision).await {
            Ok(instance) => instance,
            Err(e) => {
                tracing::warn!(
                    job = %layout.folder(),
                    store = %self.store.location(),
                    error = %e,
                    "worker was not started; job folder is published without a ready flag"
                );
                return Err(e.into());
            }
        };
        tracing::info!(job = %layout.folder(), instance = %instance.id, "worker started");

        JobControl::new(self.store.clone(), layout.clone()).mark_ready().await?;

        Ok(SubmissionReceipt {
            contact: spec.contact().to_string(),
            identity: spec.identity().clone(),
            layout,
            sizing,
            instance,
            results,
            credential,
            uploaded,
        })
    }

    async fn publish(&self, spec: &JobSpec, layout: &JobLayout) -> Result<Vec<String>, SubmitError> {
        let mut uploaded = Vec::new();
        for file in spec.uploads() {
            let key = layout.object(file.name());
            tracing::info!(job = %layout.folder(), key = %key, bytes = file.size(), "uploading");
            self.store.upload(&key, file.local()).await?;
            uploaded.push(key);
        }
        Ok(uploaded)
    }

    fn bootstrap_vars(
        &self,
        spec: &JobSpec,
        layout: &JobLayout,
        results: &ResultReference,
        credential: &Credential,
    ) -> BootstrapVars {
        use mq_core::ControlFlag::{Done, Ready, Running};

        BootstrapVars {
            bucket: self.profile.bucket.clone(),
            job_folder: layout.folder().to_string(),
            job_prefix: layout.prefix(),
            software_prefix: software_prefix(),
            contact: spec.contact().to_string(),
            password: credential.expose().to_string(),
            config_key: layout.config(),
            ready_key: layout.flag(Ready),
            running_key: layout.flag(Running),
            done_key: layout.flag(Done),
            results_key: results.key.clone(),
            results_url_key: layout.results_url(),
            remote_job_dir: self.profile.remote_job_dir.clone(),
            smtp_server: self.profile.worker.smtp_server.clone(),
            mail_from: self.profile.worker.mail_from.clone(),
            link_expires: results.expires_at,
        }
    }

    fn tags(&self, spec: &JobSpec, layout: &JobLayout) -> Vec<(String, String)> {
        let standard = [
            ("Name", format!("maxquant-{}", layout.folder())),
            ("technical_contact", spec.contact().to_string()),
            ("billing_contact", spec.contact().to_string()),
            ("description", self.profile.worker.description.clone()),
            ("owner", spec.identity().department().to_string()),
        ];
        let mut tags: Vec<(String, String)> =
            standard.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        for (key, value) in &self.profile.worker.tags {
            match tags.iter_mut().find(|(k, _)| k == key) {
                Some(existing) => existing.1 = value.clone(),
                None => tags.push((key.clone(), value.clone())),
            }
        }
        tags
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
