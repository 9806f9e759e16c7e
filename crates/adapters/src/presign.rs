// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time-limited download links for result bundles.
//!
//! The link is minted before the worker exists, so it is signed over a key
//! that will only be written when the job finishes.

use chrono::DateTime;
use hmac::{Hmac, Mac};
use mq_core::{Clock, SystemClock};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Longest validity S3 accepts for a SigV4 query-signed URL
pub const MAX_PRESIGN_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Error)]
pub enum PresignError {
    #[error("no AWS credentials available: {0}")]
    MissingCredentials(String),

    #[error("cannot sign request: {0}")]
    Signing(String),
}

/// Adapter that turns an object key into a shareable read link
pub trait Presigner: Clone + Send + Sync + 'static {
    fn presign_get(&self, key: &str, expires: Duration) -> Result<String, PresignError>;

    /// Longest validity this presigner honours; longer requests are clamped
    fn max_expiry(&self) -> Option<Duration> {
        None
    }
}

/// Access key pair, optionally with a session token.
///
/// Session credentials (SSO, assumed roles, instance roles) carry the time
/// they stop working; links signed with them die at the same moment.
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    /// Unix time the credentials expire
    pub expires_at: Option<i64>,
}

impl AwsCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
            expires_at: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: i64) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` / `AWS_SESSION_TOKEN`,
    /// plus `AWS_CREDENTIAL_EXPIRATION` when the session is time-limited
    pub fn from_env() -> Result<Option<Self>, PresignError> {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        let (Some(id), Some(secret)) =
            (non_empty("AWS_ACCESS_KEY_ID"), non_empty("AWS_SECRET_ACCESS_KEY"))
        else {
            return Ok(None);
        };
        let mut credentials = Self::new(id, secret);
        if let Some(token) = non_empty("AWS_SESSION_TOKEN") {
            credentials = credentials.with_session_token(token);
        }
        if let Some(expiration) = non_empty("AWS_CREDENTIAL_EXPIRATION") {
            credentials = credentials.with_expiry(parse_expiration(&expiration)?);
        }
        Ok(Some(credentials))
    }
}

/// RFC 3339 expiration timestamp, as the AWS tooling writes it
pub fn parse_expiration(text: &str) -> Result<i64, PresignError> {
    DateTime::parse_from_rfc3339(text.trim()).map(|t| t.timestamp()).map_err(|e| {
        PresignError::MissingCredentials(format!("unreadable credential expiration '{text}': {e}"))
    })
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// AWS Signature Version 4 query-string signing for S3 `GET`.
#[derive(Debug, Clone)]
pub struct SigV4Presigner<C: Clock = SystemClock> {
    credentials: AwsCredentials,
    region: String,
    bucket: String,
    clock: C,
}

impl SigV4Presigner<SystemClock> {
    pub fn new(credentials: AwsCredentials, region: &str, bucket: &str) -> Self {
        Self::with_clock(credentials, region, bucket, SystemClock)
    }
}

impl<C: Clock> SigV4Presigner<C> {
    pub fn with_clock(credentials: AwsCredentials, region: &str, bucket: &str, clock: C) -> Self {
        Self { credentials, region: region.to_string(), bucket: bucket.to_string(), clock }
    }

    /// Virtual-hosted endpoint for the bucket
    pub fn host(&self) -> String {
        if self.region == "us-east-1" {
            format!("{}.s3.amazonaws.com", self.bucket)
        } else {
            format!("{}.s3.{}.amazonaws.com", self.bucket, self.region)
        }
    }
}

impl<C: Clock + 'static> Presigner for SigV4Presigner<C> {
    /// Seven days, or less when the signing credentials expire sooner
    fn max_expiry(&self) -> Option<Duration> {
        let remaining = self.credentials.expires_at.map(|at| {
            let secs = at.saturating_sub(self.clock.epoch_secs()).max(0);
            Duration::from_secs(u64::try_from(secs).unwrap_or_default())
        });
        Some(remaining.map_or(MAX_PRESIGN_EXPIRY, |r| r.min(MAX_PRESIGN_EXPIRY)))
    }

    fn presign_get(&self, key: &str, expires: Duration) -> Result<String, PresignError> {
        let max = self.max_expiry().unwrap_or(MAX_PRESIGN_EXPIRY);
        let expires = if expires > max {
            if max < MAX_PRESIGN_EXPIRY {
                tracing::warn!(
                    requested_secs = expires.as_secs(),
                    max_secs = max.as_secs(),
                    "signing credentials expire soon; the results link dies with them"
                );
            } else {
                tracing::warn!(
                    requested_secs = expires.as_secs(),
                    max_secs = max.as_secs(),
                    "link validity exceeds the signing limit, clamping"
                );
            }
            max
        } else {
            expires
        };
        if expires.is_zero() {
            return Err(PresignError::Signing("signing credentials have expired".to_string()));
        }

        let now = DateTime::from_timestamp(self.clock.epoch_secs(), 0)
            .ok_or_else(|| PresignError::Signing("clock out of range".to_string()))?;
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let scope = format!("{date}/{}/s3/aws4_request", self.region);
        let host = self.host();
        let path = format!("/{}", uri_encode(key.trim_start_matches('/'), false));

        let mut query = vec![
            ("X-Amz-Algorithm".to_string(), "AWS4-HMAC-SHA256".to_string()),
            ("X-Amz-Credential".to_string(), format!("{}/{scope}", self.credentials.access_key_id)),
            ("X-Amz-Date".to_string(), amz_date.clone()),
            ("X-Amz-Expires".to_string(), expires.as_secs().to_string()),
            ("X-Amz-SignedHeaders".to_string(), "host".to_string()),
        ];
        if let Some(token) = &self.credentials.session_token {
            query.push(("X-Amz-Security-Token".to_string(), token.clone()));
        }
        query.sort();
        let canonical_query = query
            .iter()
            .map(|(k, v)| format!("{}={}", uri_encode(k, true), uri_encode(v, true)))
            .collect::<Vec<_>>()
            .join("&");

        let canonical_request =
            format!("GET\n{path}\n{canonical_query}\nhost:{host}\n\nhost\nUNSIGNED-PAYLOAD");
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{amz_date}\n{scope}\n{}",
            hex(&Sha256::digest(canonical_request.as_bytes()))
        );

        let secret = format!("AWS4{}", self.credentials.secret_access_key);
        let mut signing_key = hmac_sha256(secret.as_bytes(), date.as_bytes())?;
        for part in [self.region.as_str(), "s3", "aws4_request"] {
            signing_key = hmac_sha256(&signing_key, part.as_bytes())?;
        }
        let signature = hex(&hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

        tracing::debug!(key, expires_secs = expires.as_secs(), "presigned results link");
        Ok(format!("https://{host}{path}?{canonical_query}&X-Amz-Signature={signature}"))
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, PresignError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)
        .map_err(|e| PresignError::Signing(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// RFC 3986 percent-encoding as SigV4 requires; `/` survives in paths.
fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b'/' if !encode_slash => out.push('/'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Links for the `local` backend: `file://` URLs under the store root.
#[derive(Debug, Clone)]
pub struct FilePresigner {
    root: PathBuf,
}

impl FilePresigner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Presigner for FilePresigner {
    fn presign_get(&self, key: &str, _expires: Duration) -> Result<String, PresignError> {
        let path = key.split('/').fold(self.root.clone(), |path, segment| path.join(segment));
        Ok(format!("file://{}", path.display()))
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{PresignError, Presigner};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    /// Fake presigner producing predictable links
    #[derive(Clone, Default)]
    pub struct FakePresigner {
        calls: Arc<Mutex<Vec<(String, Duration)>>>,
    }

    impl FakePresigner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Recorded `(key, expiry)` pairs
        pub fn calls(&self) -> Vec<(String, Duration)> {
            self.calls.lock().clone()
        }
    }

    impl Presigner for FakePresigner {
        fn presign_get(&self, key: &str, expires: Duration) -> Result<String, PresignError> {
            self.calls.lock().push((key.to_string(), expires));
            Ok(format!("https://results.example/{key}?expires={}", expires.as_secs()))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakePresigner;

#[cfg(test)]
#[path = "presign_tests.rs"]
mod tests;
