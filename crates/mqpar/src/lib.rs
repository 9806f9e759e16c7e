// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mq-mqpar: structured rewriting of MaxQuant `mqpar.xml` job configurations
//!
//! The document is treated as an opaque tree except for the data-file and
//! FASTA path lists and the thread count, which are rewritten for the
//! worker's filesystem.

mod document;
mod paths;

pub use document::{ConfigError, FileInventory, LineEnding, MqparDocument};
pub use paths::{basename, RemoteDir};
