// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mq-adapters: object store, worker provisioning and link presigning
//!
//! Each concern is a trait with a cloud implementation (driving the `aws`
//! CLI or signing locally), a local-directory implementation, and a fake
//! for tests.

pub mod aws;
pub mod fs_store;
pub mod presign;
pub mod provision;
pub mod store;
pub mod subprocess;

pub use aws::{AwsCli, AwsCliProvisioner, AwsCliStore, Ec2Settings};
pub use fs_store::FsStore;
pub use presign::{
    AwsCredentials, FilePresigner, PresignError, Presigner, SigV4Presigner, MAX_PRESIGN_EXPIRY,
};
pub use provision::{Instance, ProvisionError, ProvisionRequest, Provisioner, SpoolProvisioner};
pub use store::{ObjectMeta, ObjectStore, StoreError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use presign::FakePresigner;
#[cfg(any(test, feature = "test-support"))]
pub use provision::FakeProvisioner;
#[cfg(any(test, feature = "test-support"))]
pub use store::{FakeStore, StoreCall};
