// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Where a job's results bundle will land, and the link that reads it.

use mq_adapters::{PresignError, Presigner};
use mq_core::{Clock, JobIdentity, JobLayout, ResultNaming, ResultReference, SystemClock};
use std::time::Duration;

/// 34 days
pub const DEFAULT_LINK_EXPIRY: Duration = Duration::from_secs(2_937_600);

#[derive(Clone)]
pub struct ResultLocator<P: Presigner, C: Clock = SystemClock> {
    presigner: P,
    naming: ResultNaming,
    expiry: Duration,
    config_name: String,
    clock: C,
}

impl<P: Presigner> ResultLocator<P> {
    pub fn new(presigner: P, naming: ResultNaming, expiry: Duration, config_name: &str) -> Self {
        Self::with_clock(presigner, naming, expiry, config_name, SystemClock)
    }
}

impl<P: Presigner, C: Clock> ResultLocator<P, C> {
    pub fn with_clock(
        presigner: P,
        naming: ResultNaming,
        expiry: Duration,
        config_name: &str,
        clock: C,
    ) -> Self {
        Self { presigner, naming, expiry, config_name: config_name.to_string(), clock }
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Validity the link will actually have after presigner limits
    pub fn effective_expiry(&self) -> Duration {
        self.presigner.max_expiry().map_or(self.expiry, |max| self.expiry.min(max))
    }

    /// Deterministic bundle key for the job
    pub fn key(&self, identity: &JobIdentity) -> String {
        self.naming.bundle_key(&JobLayout::new(identity, self.config_name.clone()))
    }

    /// Bundle key plus a read link, stamped with the moment the link expires
    pub fn locate(&self, identity: &JobIdentity) -> Result<ResultReference, PresignError> {
        let key = self.key(identity);
        let validity = self.effective_expiry();
        let url = self.presigner.presign_get(&key, self.expiry)?;
        let expires_at = self
            .clock
            .epoch_secs()
            .saturating_add(i64::try_from(validity.as_secs()).unwrap_or(i64::MAX));
        Ok(ResultReference { key, url, expires_at })
    }
}

#[cfg(test)]
#[path = "locator_tests.rs"]
mod tests;
