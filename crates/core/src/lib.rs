// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mq-core: job model, sizing and flag vocabulary shared by the mqsubmit crates

pub mod macros;

pub mod clock;
pub mod credential;
pub mod flag;
pub mod identity;
pub mod layout;
pub mod results;
pub mod sizing;
pub mod spec;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use credential::{Credential, CredentialGenerator, DEFAULT_CREDENTIAL_LENGTH};
pub use flag::ControlFlag;
pub use identity::{normalize_contact, JobIdentity, SpecError};
pub use layout::{software_prefix, JobLayout, CONTROL_DIR, SOFTWARE_DIR};
pub use results::{ResultNaming, ResultReference};
pub use sizing::{SizingDecision, SizingError, SizingPolicy, Tier, GB};
pub use spec::{FileRef, JobSpec};
