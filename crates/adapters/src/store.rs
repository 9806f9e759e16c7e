// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Object store adapter.
//!
//! Keys are `/`-separated paths relative to the store root (for S3, the
//! bucket). The store is the only channel between the submitter and the
//! worker, so "not found" is kept apart from every other failure: callers
//! treat a missing object as an answer, not an error.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from object store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("object already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid object key '{0}'")]
    InvalidKey(String),

    #[error("cannot read {}: {source}", path.display())]
    LocalFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store request failed: {0}")]
    Request(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Object metadata returned by [`ObjectStore::head`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectMeta {
    pub size: u64,
}

/// Adapter for a flat key/value object store
#[async_trait]
pub trait ObjectStore: Clone + Send + Sync + 'static {
    /// Human-readable location, e.g. `s3://bucket` or a directory path
    fn location(&self) -> String;

    /// Metadata lookup; [`StoreError::NotFound`] when the key is absent
    async fn head(&self, key: &str) -> Result<ObjectMeta, StoreError>;

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Create or overwrite `key`
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError>;

    /// Create `key` only if it does not exist yet.
    ///
    /// Exactly one of several concurrent callers succeeds; the others get
    /// [`StoreError::AlreadyExists`].
    async fn put_if_absent(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError>;

    /// Copy a local file to `key`
    async fn upload(&self, key: &str, local: &Path) -> Result<(), StoreError>;

    /// Remove `key`; removing an absent key is not an error
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Keys starting with `prefix`, sorted
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Object body as UTF-8 text
    async fn get_text(&self, key: &str) -> Result<String, StoreError> {
        let body = self.get(key).await?;
        String::from_utf8(body)
            .map_err(|e| StoreError::Request(format!("{key} is not valid UTF-8: {e}")))
    }
}

/// Reject keys that would escape the store root or address nothing.
pub(crate) fn check_key(key: &str) -> Result<(), StoreError> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if bad {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{check_key, ObjectMeta, ObjectStore, StoreError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::{BTreeMap, HashMap};
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    /// Recorded store operation
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum StoreCall {
        Head(String),
        Get(String),
        Put(String),
        PutIfAbsent(String),
        Upload { key: String, local: PathBuf },
        Delete(String),
        List(String),
    }

    impl StoreCall {
        pub fn key(&self) -> &str {
            match self {
                StoreCall::Head(k)
                | StoreCall::Get(k)
                | StoreCall::Put(k)
                | StoreCall::PutIfAbsent(k)
                | StoreCall::Delete(k)
                | StoreCall::List(k) => k,
                StoreCall::Upload { key, .. } => key,
            }
        }

        /// Whether the call changes the store
        pub fn is_write(&self) -> bool {
            matches!(
                self,
                StoreCall::Put(_)
                    | StoreCall::PutIfAbsent(_)
                    | StoreCall::Upload { .. }
                    | StoreCall::Delete(_)
            )
        }
    }

    #[derive(Default)]
    struct FakeStoreState {
        objects: BTreeMap<String, Vec<u8>>,
        calls: Vec<StoreCall>,
        failures: HashMap<String, String>,
    }

    /// In-memory object store that records every call
    #[derive(Clone, Default)]
    pub struct FakeStore {
        inner: Arc<Mutex<FakeStoreState>>,
    }

    impl FakeStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed an object without recording a call
        pub fn insert(&self, key: &str, body: impl Into<Vec<u8>>) {
            self.inner.lock().objects.insert(key.to_string(), body.into());
        }

        /// Make every operation on `key` fail with [`StoreError::Request`]
        pub fn fail_on(&self, key: &str, message: &str) {
            self.inner.lock().failures.insert(key.to_string(), message.to_string());
        }

        pub fn object(&self, key: &str) -> Option<Vec<u8>> {
            self.inner.lock().objects.get(key).cloned()
        }

        pub fn text(&self, key: &str) -> Option<String> {
            self.object(key).map(|b| String::from_utf8_lossy(&b).into_owned())
        }

        pub fn contains(&self, key: &str) -> bool {
            self.inner.lock().objects.contains_key(key)
        }

        /// All keys, sorted
        pub fn keys(&self) -> Vec<String> {
            self.inner.lock().objects.keys().cloned().collect()
        }

        /// Every recorded call, in order
        pub fn calls(&self) -> Vec<StoreCall> {
            self.inner.lock().calls.clone()
        }

        /// Recorded calls that modified the store, in order
        pub fn writes(&self) -> Vec<StoreCall> {
            self.calls().into_iter().filter(StoreCall::is_write).collect()
        }

        fn record(&self, call: StoreCall) -> Result<(), StoreError> {
            if !matches!(call, StoreCall::List(_)) {
                check_key(call.key())?;
            }
            let mut state = self.inner.lock();
            let failure = state.failures.get(call.key()).cloned();
            state.calls.push(call);
            match failure {
                Some(message) => Err(StoreError::Request(message)),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl ObjectStore for FakeStore {
        fn location(&self) -> String {
            "fake://store".to_string()
        }

        async fn head(&self, key: &str) -> Result<ObjectMeta, StoreError> {
            self.record(StoreCall::Head(key.to_string()))?;
            self.inner
                .lock()
                .objects
                .get(key)
                .map(|body| ObjectMeta { size: body.len() as u64 })
                .ok_or_else(|| StoreError::NotFound(key.to_string()))
        }

        async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
            self.record(StoreCall::Get(key.to_string()))?;
            self.object(key).ok_or_else(|| StoreError::NotFound(key.to_string()))
        }

        async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
            self.record(StoreCall::Put(key.to_string()))?;
            self.insert(key, body);
            Ok(())
        }

        async fn put_if_absent(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
            self.record(StoreCall::PutIfAbsent(key.to_string()))?;
            let mut state = self.inner.lock();
            if state.objects.contains_key(key) {
                return Err(StoreError::AlreadyExists(key.to_string()));
            }
            state.objects.insert(key.to_string(), body);
            Ok(())
        }

        async fn upload(&self, key: &str, local: &Path) -> Result<(), StoreError> {
            self.record(StoreCall::Upload { key: key.to_string(), local: local.to_path_buf() })?;
            let body = tokio::fs::read(local)
                .await
                .map_err(|source| StoreError::LocalFile { path: local.to_path_buf(), source })?;
            self.insert(key, body);
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), StoreError> {
            self.record(StoreCall::Delete(key.to_string()))?;
            self.inner.lock().objects.remove(key);
            Ok(())
        }

        async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
            self.record(StoreCall::List(prefix.to_string()))?;
            Ok(self.inner.lock().objects.keys().filter(|k| k.starts_with(prefix)).cloned().collect())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeStore, StoreCall};

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
