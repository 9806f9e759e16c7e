// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

#![allow(clippy::panic)]

use crate::{FileRef, JobIdentity, JobSpec};

// ── Proptest strategies ─────────────────────────────────────────────────

pub mod strategies {
    use crate::ControlFlag;
    use proptest::prelude::*;

    pub fn arb_flag() -> impl Strategy<Value = ControlFlag> {
        prop_oneof![Just(ControlFlag::Ready), Just(ControlFlag::Running), Just(ControlFlag::Done)]
    }

    /// Identity component: non-empty, key-safe characters
    pub fn arb_name() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_][A-Za-z0-9._-]{0,15}"
    }

    /// A file basename such as `sample_01.raw`
    pub fn arb_basename() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_][A-Za-z0-9_ .-]{0,20}\\.(raw|mzXML|fasta)"
    }
}

// ── Fixtures ────────────────────────────────────────────────────────────

pub fn identity(department: &str, name: &str) -> JobIdentity {
    match JobIdentity::new(department, name) {
        Ok(id) => id,
        Err(e) => panic!("invalid test identity {department}-{name}: {e}"),
    }
}

/// Job spec with in-memory file refs (local paths are not checked here)
pub fn job_spec(department: &str, name: &str, inputs: &[(&str, u64)], references: &[&str]) -> JobSpec {
    let to_ref = |(file, size): (&str, u64)| FileRef::new(file, format!("/jobs/{file}"), size);
    let inputs = inputs.iter().map(|&(f, s)| to_ref((f, s))).collect();
    let references = references.iter().map(|f| to_ref((f, 1))).collect();
    match JobSpec::new(identity(department, name), "user@example.org", inputs, references) {
        Ok(spec) => spec,
        Err(e) => panic!("invalid test spec: {e}"),
    }
}
