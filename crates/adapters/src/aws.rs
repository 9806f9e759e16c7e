// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! S3 and EC2 through the `aws` command line client.
//!
//! Credentials, profiles and regions resolve exactly as they do for the
//! user's own `aws` invocations; nothing here stores or embeds keys.

use crate::presign::{parse_expiration, AwsCredentials, PresignError};
use crate::provision::{Instance, ProvisionError, ProvisionRequest, Provisioner};
use crate::store::{check_key, ObjectMeta, ObjectStore, StoreError};
use crate::subprocess::{run_with_timeout, SubprocessError, AWS_CALL_TIMEOUT, UPLOAD_TIMEOUT};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

/// Failed `aws` invocation
#[derive(Debug)]
pub(crate) enum CliFailure {
    Subprocess(SubprocessError),
    Exit { description: String, code: Option<i32>, stderr: String },
}

impl CliFailure {
    fn message(&self) -> String {
        match self {
            CliFailure::Subprocess(e) => e.to_string(),
            CliFailure::Exit { description, code, stderr } => match code {
                Some(code) => format!("{description} exited with {code}: {stderr}"),
                None => format!("{description} was killed: {stderr}"),
            },
        }
    }

    fn stderr(&self) -> &str {
        match self {
            CliFailure::Subprocess(_) => "",
            CliFailure::Exit { stderr, .. } => stderr,
        }
    }

    /// Map to a store error, keeping 404 and 412 answers apart
    pub(crate) fn into_store_error(self, key: &str) -> StoreError {
        let stderr = self.stderr();
        if stderr.contains("(404)") || stderr.contains("NoSuchKey") || stderr.contains("Not Found")
        {
            StoreError::NotFound(key.to_string())
        } else if stderr.contains("(412)")
            || stderr.contains("PreconditionFailed")
            || stderr.contains("ConditionalRequestConflict")
        {
            StoreError::AlreadyExists(key.to_string())
        } else {
            StoreError::Request(self.message())
        }
    }
}

/// Invoker for the `aws` program.
#[derive(Debug, Clone)]
pub struct AwsCli {
    program: String,
    region: Option<String>,
}

impl AwsCli {
    pub fn new(region: Option<String>) -> Self {
        Self { program: "aws".to_string(), region }
    }

    /// Use a different executable (a wrapper script, or a stub in tests)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    async fn run(
        &self,
        args: &[&str],
        timeout: Duration,
        description: &str,
    ) -> Result<Vec<u8>, CliFailure> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["--output", "json"]);
        if let Some(region) = &self.region {
            cmd.args(["--region", region]);
        }
        cmd.args(args);
        tracing::debug!(%description, "running aws");

        let output =
            run_with_timeout(cmd, timeout, description).await.map_err(CliFailure::Subprocess)?;
        if !output.status.success() {
            return Err(CliFailure::Exit {
                description: description.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    async fn run_json(&self, args: &[&str], description: &str) -> Result<Value, CliFailure> {
        let stdout = self.run(args, AWS_CALL_TIMEOUT, description).await?;
        if stdout.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&stdout).map_err(|e| CliFailure::Exit {
            description: description.to_string(),
            code: Some(0),
            stderr: format!("unparseable output: {e}"),
        })
    }

    /// Resolve the caller's credentials the way the CLI itself would
    /// (environment, shared profile, SSO cache, instance role).
    pub async fn export_credentials(&self) -> Result<AwsCredentials, PresignError> {
        let value = self
            .run_json(
                &["configure", "export-credentials", "--format", "process"],
                "aws configure export-credentials",
            )
            .await
            .map_err(|e| PresignError::MissingCredentials(e.message()))?;
        parse_exported_credentials(&value)
    }
}

pub(crate) fn parse_exported_credentials(value: &Value) -> Result<AwsCredentials, PresignError> {
    let field = |name: &str| value.get(name).and_then(Value::as_str).filter(|s| !s.is_empty());
    let (Some(id), Some(secret)) = (field("AccessKeyId"), field("SecretAccessKey")) else {
        return Err(PresignError::MissingCredentials("no access key in CLI output".to_string()));
    };
    let mut credentials = AwsCredentials::new(id, secret);
    if let Some(token) = field("SessionToken") {
        credentials = credentials.with_session_token(token);
    }
    if let Some(expiration) = field("Expiration") {
        credentials = credentials.with_expiry(parse_expiration(expiration)?);
    }
    Ok(credentials)
}

// ── S3 ──────────────────────────────────────────────────────────────────

/// Object store backed by an S3 bucket
#[derive(Debug, Clone)]
pub struct AwsCliStore {
    cli: AwsCli,
    bucket: String,
}

impl AwsCliStore {
    pub fn new(cli: AwsCli, bucket: impl Into<String>) -> Self {
        Self { cli, bucket: bucket.into() }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn url(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }

    async fn put_object(&self, key: &str, body: Vec<u8>, if_absent: bool) -> Result<(), StoreError> {
        check_key(key)?;
        let temp = tempfile::Builder::new()
            .prefix("mq-put-")
            .tempfile()
            .map_err(|e| StoreError::Request(format!("cannot stage upload: {e}")))?;
        tokio::fs::write(temp.path(), body)
            .await
            .map_err(|e| StoreError::Request(format!("cannot stage upload: {e}")))?;
        let staged = temp.path().display().to_string();

        let mut args =
            vec!["s3api", "put-object", "--bucket", &self.bucket, "--key", key, "--body", &staged];
        if if_absent {
            args.extend(["--if-none-match", "*"]);
        }
        self.cli
            .run(&args, AWS_CALL_TIMEOUT, "aws s3api put-object")
            .await
            .map_err(|e| e.into_store_error(key))?;
        tracing::debug!(key, bucket = %self.bucket, if_absent, "put object");
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for AwsCliStore {
    fn location(&self) -> String {
        format!("s3://{}", self.bucket)
    }

    async fn head(&self, key: &str) -> Result<ObjectMeta, StoreError> {
        check_key(key)?;
        let value = self
            .cli
            .run_json(
                &["s3api", "head-object", "--bucket", &self.bucket, "--key", key],
                "aws s3api head-object",
            )
            .await
            .map_err(|e| e.into_store_error(key))?;
        let size = value.get("ContentLength").and_then(Value::as_u64).unwrap_or_default();
        Ok(ObjectMeta { size })
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        check_key(key)?;
        let url = self.url(key);
        self.cli
            .run(&["s3", "cp", &url, "-", "--only-show-errors"], AWS_CALL_TIMEOUT, "aws s3 cp")
            .await
            .map_err(|e| e.into_store_error(key))
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        self.put_object(key, body, false).await
    }

    async fn put_if_absent(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        self.put_object(key, body, true).await
    }

    async fn upload(&self, key: &str, local: &Path) -> Result<(), StoreError> {
        check_key(key)?;
        tokio::fs::metadata(local)
            .await
            .map_err(|source| StoreError::LocalFile { path: local.to_path_buf(), source })?;
        let local_arg = local.display().to_string();
        let url = self.url(key);
        self.cli
            .run(&["s3", "cp", &local_arg, &url, "--only-show-errors"], UPLOAD_TIMEOUT, "aws s3 cp")
            .await
            .map_err(|e| e.into_store_error(key))?;
        tracing::debug!(key, local = %local.display(), "uploaded file");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        self.cli
            .run(
                &["s3api", "delete-object", "--bucket", &self.bucket, "--key", key],
                AWS_CALL_TIMEOUT,
                "aws s3api delete-object",
            )
            .await
            .map_err(|e| e.into_store_error(key))?;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let value = self
            .cli
            .run_json(
                &["s3api", "list-objects-v2", "--bucket", &self.bucket, "--prefix", prefix],
                "aws s3api list-objects-v2",
            )
            .await
            .map_err(|e| e.into_store_error(prefix))?;
        let mut keys: Vec<String> = value
            .get("Contents")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get("Key").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        keys.sort();
        Ok(keys)
    }
}

// ── EC2 ─────────────────────────────────────────────────────────────────

/// Launch settings for EC2 workers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ec2Settings {
    /// Image name filter; the newest available match is used
    pub image_name_pattern: String,
    pub image_owner: String,
    pub subnet_id: Option<String>,
    pub security_group_ids: Vec<String>,
    pub key_name: Option<String>,
    /// Instance profile name, or its ARN
    pub instance_profile: Option<String>,
    pub volume_type: String,
    pub device_name: String,
    pub monitoring: bool,
}

impl Default for Ec2Settings {
    fn default() -> Self {
        Self {
            image_name_pattern: "Windows_Server-2012-R2_RTM-English-64Bit-Base-*".to_string(),
            image_owner: "amazon".to_string(),
            subnet_id: None,
            security_group_ids: Vec::new(),
            key_name: None,
            instance_profile: None,
            volume_type: "gp2".to_string(),
            device_name: "/dev/sda1".to_string(),
            monitoring: true,
        }
    }
}

/// Provisioner that launches one EC2 instance per job
#[derive(Debug, Clone)]
pub struct AwsCliProvisioner {
    cli: AwsCli,
    settings: Ec2Settings,
}

impl AwsCliProvisioner {
    pub fn new(cli: AwsCli, settings: Ec2Settings) -> Self {
        Self { cli, settings }
    }

    /// Newest available image matching the configured pattern and owner
    pub async fn find_image(&self) -> Result<String, ProvisionError> {
        let name_filter = format!("Name=name,Values={}", self.settings.image_name_pattern);
        let value = self
            .cli
            .run_json(
                &[
                    "ec2",
                    "describe-images",
                    "--owners",
                    &self.settings.image_owner,
                    "--filters",
                    &name_filter,
                    "Name=state,Values=available",
                    "Name=architecture,Values=x86_64",
                    "Name=root-device-type,Values=ebs",
                    "Name=virtualization-type,Values=hvm",
                ],
                "aws ec2 describe-images",
            )
            .await
            .map_err(|e| ProvisionError::Request(e.message()))?;
        newest_image(&value)
            .ok_or_else(|| ProvisionError::NoImage(self.settings.image_name_pattern.clone()))
    }
}

#[async_trait]
impl Provisioner for AwsCliProvisioner {
    async fn provision(&self, request: &ProvisionRequest) -> Result<Instance, ProvisionError> {
        let image_id = self.find_image().await?;
        tracing::info!(%image_id, name = %request.name, "selected base image");

        let script = stage_user_data(&request.user_data).await?;
        let args = run_instances_args(&self.settings, &image_id, request, script.path());
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let value = self
            .cli
            .run_json(&args, "aws ec2 run-instances")
            .await
            .map_err(|e| ProvisionError::Request(e.message()))?;
        let instance = parse_instance(&value)?;
        tracing::info!(instance = %instance.id, class = %request.compute_class, "launched worker");
        Ok(instance)
    }
}

/// Write the bootstrap script to an owner-only temp file.
///
/// The script carries the worker's password, so it never goes on a command
/// line where other local users could read it.
async fn stage_user_data(script: &str) -> Result<tempfile::NamedTempFile, ProvisionError> {
    let staged = tempfile::Builder::new()
        .prefix("mq-user-data-")
        .tempfile()
        .map_err(|e| ProvisionError::Request(format!("cannot stage bootstrap script: {e}")))?;
    tokio::fs::write(staged.path(), script)
        .await
        .map_err(|e| ProvisionError::Request(format!("cannot stage bootstrap script: {e}")))?;
    Ok(staged)
}

/// Pick the image with the latest `CreationDate` (ISO 8601, so it sorts as text).
pub(crate) fn newest_image(value: &Value) -> Option<String> {
    value
        .get("Images")?
        .as_array()?
        .iter()
        .filter_map(|image| {
            let date = image.get("CreationDate")?.as_str()?;
            let id = image.get("ImageId")?.as_str()?;
            Some((date, id))
        })
        .max()
        .map(|(_, id)| id.to_string())
}

pub(crate) fn run_instances_args(
    settings: &Ec2Settings,
    image_id: &str,
    request: &ProvisionRequest,
    user_data: &Path,
) -> Vec<String> {
    let tags: Vec<Value> =
        request.tags.iter().map(|(k, v)| json!({ "Key": k, "Value": v })).collect();
    let tag_specs = json!([
        { "ResourceType": "instance", "Tags": tags },
        { "ResourceType": "volume", "Tags": tags },
    ]);
    let block_devices = json!([{
        "DeviceName": settings.device_name,
        "Ebs": {
            "VolumeSize": request.volume_size_gb,
            "DeleteOnTermination": true,
            "VolumeType": settings.volume_type,
        }
    }]);

    let mut args: Vec<String> = [
        "ec2",
        "run-instances",
        "--image-id",
        image_id,
        "--instance-type",
        &request.compute_class,
        "--count",
        "1",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    args.push("--user-data".to_string());
    args.push(format!("file://{}", user_data.display()));
    args.push("--block-device-mappings".to_string());
    args.push(block_devices.to_string());
    args.push("--tag-specifications".to_string());
    args.push(tag_specs.to_string());
    if settings.monitoring {
        args.extend(["--monitoring".to_string(), "Enabled=true".to_string()]);
    }
    if let Some(subnet) = &settings.subnet_id {
        args.extend(["--subnet-id".to_string(), subnet.clone()]);
    }
    if !settings.security_group_ids.is_empty() {
        args.push("--security-group-ids".to_string());
        args.extend(settings.security_group_ids.iter().cloned());
    }
    if let Some(key_name) = &settings.key_name {
        args.extend(["--key-name".to_string(), key_name.clone()]);
    }
    if let Some(profile) = &settings.instance_profile {
        let spec = if profile.starts_with("arn:") {
            format!("Arn={profile}")
        } else {
            format!("Name={profile}")
        };
        args.extend(["--iam-instance-profile".to_string(), spec]);
    }
    args
}

pub(crate) fn parse_instance(value: &Value) -> Result<Instance, ProvisionError> {
    let first = value
        .get("Instances")
        .and_then(Value::as_array)
        .and_then(|instances| instances.first())
        .ok_or_else(|| ProvisionError::Response("no instance in run-instances output".into()))?;
    let id = first
        .get("InstanceId")
        .and_then(Value::as_str)
        .ok_or_else(|| ProvisionError::Response("instance without InstanceId".into()))?;
    let private_ip = first.get("PrivateIpAddress").and_then(Value::as_str).map(str::to_string);
    Ok(Instance { id: id.to_string(), private_ip })
}

#[cfg(test)]
#[path = "aws_tests.rs"]
mod tests;
