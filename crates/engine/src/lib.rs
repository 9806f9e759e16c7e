// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mq-engine: registration, flag protocol, bootstrap and the submission
//! pipeline

pub mod bootstrap;
pub mod control;
pub mod inventory;
pub mod locator;
pub mod orchestrator;
pub mod profile;
pub mod registry;

pub use bootstrap::{BootstrapComposer, BootstrapError, BootstrapVars, ScriptDialect};
pub use control::{JobControl, JobStatus, ProtocolError};
pub use inventory::{InventoryError, ResolvedFiles, EXTRA_FILES};
pub use locator::{ResultLocator, DEFAULT_LINK_EXPIRY};
pub use orchestrator::{SubmissionOrchestrator, SubmissionReceipt, SubmitError, SubmitRequest};
pub use profile::{
    Backend, Profile, ProfileError, ResultsSettings, SizingSettings, WorkerSettings, PROFILE_FILE,
};
pub use registry::{JobRegistry, RegistryError};
