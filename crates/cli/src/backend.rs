// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Profile loading and adapter wiring for the configured backend.

use anyhow::Context;
use mq_adapters::{
    AwsCli, AwsCliProvisioner, AwsCliStore, AwsCredentials, FilePresigner, FsStore,
    SigV4Presigner, SpoolProvisioner,
};
use mq_engine::Profile;
use std::path::Path;

/// Resolve the deployment profile: `--profile`, `MQSUBMIT_PROFILE`, the user
/// config dir, then built-in defaults.
pub fn load_profile(explicit: Option<&Path>) -> anyhow::Result<Profile> {
    let from_env = crate::env::profile_path();
    let config_dir = crate::env::config_dir();
    let (profile, used) =
        Profile::discover(explicit, from_env.as_deref(), config_dir.as_deref())?;
    match used {
        Some(path) => tracing::info!(path = %path.display(), "loaded profile"),
        None => tracing::info!("using built-in profile"),
    }
    tracing::debug!(backend = %profile.backend, bucket = %profile.bucket, "profile");
    Ok(profile)
}

pub fn aws_cli(profile: &Profile) -> AwsCli {
    AwsCli::new(Some(profile.region.clone()))
}

pub fn aws_store(cli: &AwsCli, profile: &Profile) -> AwsCliStore {
    AwsCliStore::new(cli.clone(), profile.bucket.clone())
}

pub fn aws_provisioner(cli: &AwsCli, profile: &Profile) -> AwsCliProvisioner {
    AwsCliProvisioner::new(cli.clone(), profile.worker.ec2.clone())
}

/// Signing keys come from the environment, else from whatever the `aws` CLI
/// resolves (shared config, SSO, instance profile).
pub async fn aws_presigner(cli: &AwsCli, profile: &Profile) -> anyhow::Result<SigV4Presigner> {
    let from_env = AwsCredentials::from_env().context("invalid AWS credentials in the environment")?;
    let credentials = match from_env {
        Some(credentials) => credentials,
        None => cli
            .export_credentials()
            .await
            .context("no AWS credentials for signing the results link")?,
    };
    Ok(SigV4Presigner::new(credentials, &profile.region, &profile.bucket))
}

pub fn local_store(profile: &Profile) -> FsStore {
    FsStore::new(&profile.local_root)
}

pub fn local_provisioner(profile: &Profile) -> SpoolProvisioner {
    SpoolProvisioner::new(profile.spool_dir())
}

pub fn local_presigner(profile: &Profile) -> FilePresigner {
    FilePresigner::new(&profile.local_root)
}
