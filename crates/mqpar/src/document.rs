// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsed `mqpar.xml` with the two rewrites the pipeline needs.
//!
//! Rewriting happens in two passes because the thread count depends on the
//! number of input files:
//!
//! 1. [`MqparDocument::rewrite_paths`] points every data-file and FASTA entry
//!    at the worker's job directory and returns the file inventory.
//! 2. [`MqparDocument::set_threads`] writes the thread count chosen from that
//!    inventory.
//!
//! Rewriting an already rewritten document is a no-op: the basename of
//! `remote + name` is `name`.

use crate::paths::{basename, RemoteDir};
use std::collections::HashSet;
use thiserror::Error;
use xmltree::{Element, EmitterConfig, XMLNode};

const FILE_PATHS: &str = "filePaths";
const FASTA_FILES: &str = "fastaFiles";
const FASTA_INFO: &str = "FastaFileInfo";
const FASTA_PATH: &str = "fastaFilePath";
const STRING: &str = "string";
const NUM_THREADS: &str = "numThreads";

/// Errors from reading, rewriting or rendering a job configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot parse job configuration: {0}")]
    Parse(String),

    #[error("job configuration is malformed: {0}")]
    Structure(String),

    #[error("cannot render job configuration: {0}")]
    Render(String),
}

/// Basenames referenced by the configuration, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInventory {
    /// Data files (`<filePaths>`)
    pub inputs: Vec<String>,
    /// FASTA databases (`<fastaFiles>`)
    pub references: Vec<String>,
}

impl FileInventory {
    pub fn len(&self) -> usize {
        self.inputs.len() + self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.references.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    /// Windows line endings, as MaxQuant writes them
    Crlf,
}

#[derive(Debug, Clone)]
pub struct MqparDocument {
    root: Element,
}

impl MqparDocument {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Self::from_bytes(text.as_bytes())
    }

    /// Parse a file as read from disk; a byte-order mark or the XML
    /// declaration picks the encoding
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let root = Element::parse(bytes).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(Self { root })
    }

    /// Root element name (`MaxQuantParams` for MaxQuant-generated files)
    pub fn root_name(&self) -> &str {
        &self.root.name
    }

    /// Point every data-file and FASTA path at `remote` and collect the
    /// basenames.
    ///
    /// Both `<fastaFiles><string>` (older MaxQuant) and
    /// `<fastaFiles><FastaFileInfo><fastaFilePath>` (1.6+) are recognized.
    pub fn rewrite_paths(&mut self, remote: &RemoteDir) -> Result<FileInventory, ConfigError> {
        let mut inventory = FileInventory::default();

        let mut saw_inputs = false;
        for list in children_named_mut(&mut self.root, FILE_PATHS) {
            saw_inputs = true;
            for entry in children_named_mut(list, STRING) {
                inventory.inputs.push(rewrite_entry(entry, remote, FILE_PATHS)?);
            }
        }
        if !saw_inputs {
            return Err(missing(FILE_PATHS));
        }
        if inventory.inputs.is_empty() {
            return Err(ConfigError::Structure(format!("<{FILE_PATHS}> lists no data files")));
        }

        let mut saw_references = false;
        for list in children_named_mut(&mut self.root, FASTA_FILES) {
            saw_references = true;
            for entry in list.children.iter_mut().filter_map(XMLNode::as_mut_element) {
                let path_element = if entry.name == STRING {
                    entry
                } else if entry.name == FASTA_INFO {
                    entry
                        .get_mut_child(FASTA_PATH)
                        .ok_or_else(|| missing(&format!("{FASTA_INFO}/{FASTA_PATH}")))?
                } else {
                    continue;
                };
                inventory.references.push(rewrite_entry(path_element, remote, FASTA_FILES)?);
            }
        }
        if !saw_references {
            return Err(missing(FASTA_FILES));
        }

        check_unique(&inventory)?;
        tracing::debug!(
            inputs = inventory.inputs.len(),
            references = inventory.references.len(),
            remote = %remote,
            "rewrote configuration paths"
        );
        Ok(inventory)
    }

    /// Set `<numThreads>`
    pub fn set_threads(&mut self, threads: u32) -> Result<(), ConfigError> {
        let element = self.root.get_mut_child(NUM_THREADS).ok_or_else(|| missing(NUM_THREADS))?;
        set_text(element, threads.to_string());
        Ok(())
    }

    pub fn threads(&self) -> Option<u32> {
        self.root.get_child(NUM_THREADS)?.get_text()?.trim().parse().ok()
    }

    /// Data-file paths as currently written in the document
    pub fn input_paths(&self) -> Vec<String> {
        children_named(&self.root, FILE_PATHS)
            .flat_map(|list| children_named(list, STRING))
            .map(text_of)
            .collect()
    }

    /// FASTA paths as currently written in the document
    pub fn reference_paths(&self) -> Vec<String> {
        children_named(&self.root, FASTA_FILES)
            .flat_map(|list| list.children.iter().filter_map(XMLNode::as_element))
            .filter_map(|entry| match entry.name.as_str() {
                STRING => Some(text_of(entry)),
                FASTA_INFO => entry.get_child(FASTA_PATH).map(text_of),
                _ => None,
            })
            .collect()
    }

    /// Serialize with an XML declaration and indentation.
    pub fn render(&self, line_ending: LineEnding) -> Result<String, ConfigError> {
        let mut out = Vec::new();
        let config = EmitterConfig::new().perform_indent(true).write_document_declaration(true);
        self.root
            .write_with_config(&mut out, config)
            .map_err(|e| ConfigError::Render(e.to_string()))?;
        let text = String::from_utf8(out).map_err(|e| ConfigError::Render(e.to_string()))?;
        Ok(match line_ending {
            LineEnding::Lf => text,
            LineEnding::Crlf => text.replace("\r\n", "\n").replace('\n', "\r\n"),
        })
    }
}

fn missing(what: &str) -> ConfigError {
    ConfigError::Structure(format!("missing <{what}>"))
}

fn children_named<'a>(parent: &'a Element, name: &'a str) -> impl Iterator<Item = &'a Element> {
    parent.children.iter().filter_map(XMLNode::as_element).filter(move |e| e.name == name)
}

fn children_named_mut<'a>(
    parent: &'a mut Element,
    name: &'a str,
) -> impl Iterator<Item = &'a mut Element> {
    parent.children.iter_mut().filter_map(XMLNode::as_mut_element).filter(move |e| e.name == name)
}

fn text_of(element: &Element) -> String {
    element.get_text().map(|t| t.trim().to_string()).unwrap_or_default()
}

fn set_text(element: &mut Element, text: String) {
    element.children = vec![XMLNode::Text(text)];
}

fn rewrite_entry(
    element: &mut Element,
    remote: &RemoteDir,
    list: &str,
) -> Result<String, ConfigError> {
    let original = text_of(element);
    let name = basename(&original).to_string();
    if name.is_empty() {
        return Err(ConfigError::Structure(format!(
            "<{list}> entry '{original}' does not name a file"
        )));
    }
    set_text(element, remote.join(&name));
    Ok(name)
}

/// Files are published flat into the job folder, so two entries with the
/// same basename would overwrite each other.
fn check_unique(inventory: &FileInventory) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for name in inventory.inputs.iter().chain(&inventory.references) {
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::Structure(format!(
                "file name '{name}' is listed more than once"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
