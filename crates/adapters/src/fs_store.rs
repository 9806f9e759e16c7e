// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory-backed object store for the `local` backend.
//!
//! Each key maps to a file under the root; `put_if_absent` relies on the
//! filesystem's exclusive create.

use crate::store::{check_key, ObjectMeta, ObjectStore, StoreError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, key: &str) -> Result<PathBuf, StoreError> {
        check_key(key)?;
        Ok(key.split('/').fold(self.root.clone(), |path, segment| path.join(segment)))
    }

    async fn ensure_parent(path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| io_error(parent, e))?;
        }
        Ok(())
    }
}

fn io_error(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Request(format!("{}: {e}", path.display()))
}

fn not_found_or(key: &str, path: &Path, e: std::io::Error) -> StoreError {
    if e.kind() == ErrorKind::NotFound {
        StoreError::NotFound(key.to_string())
    } else {
        io_error(path, e)
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    fn location(&self) -> String {
        self.root.display().to_string()
    }

    async fn head(&self, key: &str) -> Result<ObjectMeta, StoreError> {
        let path = self.path(key)?;
        let meta = tokio::fs::metadata(&path).await.map_err(|e| not_found_or(key, &path, e))?;
        if !meta.is_file() {
            return Err(StoreError::NotFound(key.to_string()));
        }
        Ok(ObjectMeta { size: meta.len() })
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path(key)?;
        tokio::fs::read(&path).await.map_err(|e| not_found_or(key, &path, e))
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        let path = self.path(key)?;
        Self::ensure_parent(&path).await?;
        tokio::fs::write(&path, body).await.map_err(|e| io_error(&path, e))?;
        tracing::debug!(key, store = %self.root.display(), "put object");
        Ok(())
    }

    async fn put_if_absent(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        use tokio::io::AsyncWriteExt;

        let path = self.path(key)?;
        Self::ensure_parent(&path).await?;
        let mut file =
            match tokio::fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    return Err(StoreError::AlreadyExists(key.to_string()));
                }
                Err(e) => return Err(io_error(&path, e)),
            };
        file.write_all(&body).await.map_err(|e| io_error(&path, e))?;
        file.flush().await.map_err(|e| io_error(&path, e))?;
        tracing::debug!(key, store = %self.root.display(), "created object");
        Ok(())
    }

    async fn upload(&self, key: &str, local: &Path) -> Result<(), StoreError> {
        let path = self.path(key)?;
        Self::ensure_parent(&path).await?;
        tokio::fs::copy(local, &path)
            .await
            .map_err(|source| StoreError::LocalFile { path: local.to_path_buf(), source })?;
        tracing::debug!(key, local = %local.display(), "uploaded file");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let root = self.root.clone();
        let prefix = prefix.to_string();
        tokio::task::spawn_blocking(move || {
            let mut keys = Vec::new();
            walk(&root, "", &mut keys).map_err(|e| io_error(&root, e))?;
            keys.retain(|k| k.starts_with(&prefix));
            keys.sort();
            Ok(keys)
        })
        .await
        .map_err(|e| StoreError::Request(format!("listing task failed: {e}")))?
    }
}

fn walk(dir: &Path, prefix: &str, keys: &mut Vec<String>) -> std::io::Result<()> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let key = format!("{prefix}{name}");
        if entry.file_type()?.is_dir() {
            walk(&entry.path(), &format!("{key}/"), keys)?;
        } else {
            keys.push(key);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "fs_store_tests.rs"]
mod tests;
