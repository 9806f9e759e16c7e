// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolve configuration basenames against the local job directory.

use mq_core::FileRef;
use mq_mqpar::FileInventory;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Optional MaxQuant side files, picked up when present in the job directory
pub const EXTRA_FILES: [&str; 2] = ["databases.xml", "modifications.xml"];

#[derive(Debug, Error)]
pub enum InventoryError {
    /// Every listed file that is absent, in configuration order
    #[error("{} file(s) not found in the job directory", .0.len())]
    Missing(Vec<PathBuf>),

    #[error("cannot inspect {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Local files backing one configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFiles {
    pub inputs: Vec<FileRef>,
    pub references: Vec<FileRef>,
    pub extras: Vec<FileRef>,
}

/// Job directory of a configuration file: its parent, or `.` for a bare name
pub fn job_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Look up every inventory entry under `dir`.
///
/// Missing files are collected rather than failing on the first, so the
/// user sees the whole list at once.
pub async fn resolve(dir: &Path, inventory: &FileInventory) -> Result<ResolvedFiles, InventoryError> {
    let mut missing = Vec::new();
    let inputs = lookup_all(dir, &inventory.inputs, &mut missing).await?;
    let references = lookup_all(dir, &inventory.references, &mut missing).await?;
    if !missing.is_empty() {
        return Err(InventoryError::Missing(missing));
    }

    let mut extras = Vec::new();
    for name in EXTRA_FILES {
        if let Some(file) = lookup(dir, name).await? {
            tracing::info!(file = name, "found custom MaxQuant file");
            extras.push(file);
        }
    }

    Ok(ResolvedFiles { inputs, references, extras })
}

async fn lookup_all(
    dir: &Path,
    names: &[String],
    missing: &mut Vec<PathBuf>,
) -> Result<Vec<FileRef>, InventoryError> {
    let mut found = Vec::with_capacity(names.len());
    for name in names {
        match lookup(dir, name).await? {
            Some(file) => found.push(file),
            None => missing.push(dir.join(name)),
        }
    }
    Ok(found)
}

async fn lookup(dir: &Path, name: &str) -> Result<Option<FileRef>, InventoryError> {
    let path = dir.join(name);
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => Ok(Some(FileRef::new(name, path, meta.len()))),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(InventoryError::Io { path, source }),
    }
}

#[cfg(test)]
#[path = "inventory_tests.rs"]
mod tests;
