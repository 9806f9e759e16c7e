// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource sizing: file count and input size to compute class, thread
//! count and volume size.
//!
//! [`SizingPolicy::decide`] is a pure function of its arguments. Tiers are
//! stepped by input-file count; the thread count follows the file count up to
//! the tier's ceiling. Counts past the largest normal tier are clipped to it
//! unless the job is expedited, in which case the extra-large tier applies.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One decimal gigabyte
pub const GB: u64 = 1_000_000_000;

/// A compute class and the job sizes it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub compute_class: String,
    /// Largest input-file count this tier is chosen for
    pub max_files: usize,
    /// Parallelism ceiling for the compute class
    pub max_threads: u32,
}

impl Tier {
    pub fn new(compute_class: impl Into<String>, max_files: usize, max_threads: u32) -> Self {
        Self { compute_class: compute_class.into(), max_files, max_threads }
    }
}

/// Resources chosen for one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizingDecision {
    pub compute_class: String,
    pub threads: u32,
    pub volume_size_bytes: u64,
}

impl SizingDecision {
    /// Volume size in whole decimal gigabytes, rounded up
    pub fn volume_size_gb(&self) -> u64 {
        self.volume_size_bytes.div_ceil(GB)
    }
}

/// Invalid tier tables
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizingError {
    #[error("sizing policy needs at least one tier")]
    NoTiers,

    #[error("tier '{class}' must serve more files than the tier before it")]
    UnorderedFiles { class: String },

    #[error("tier '{class}' has fewer threads than the tier before it")]
    UnorderedThreads { class: String },

    #[error("tier '{class}' has a zero thread ceiling")]
    ZeroThreads { class: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizingPolicy {
    tiers: Vec<Tier>,
    expedite: Tier,
    volume_multiplier: u64,
    base_padding_bytes: u64,
}

impl SizingPolicy {
    /// Build a policy. Tiers must be ascending in both file count and
    /// thread ceiling, and the expedite tier must not be smaller than the
    /// last normal tier.
    pub fn new(
        tiers: Vec<Tier>,
        expedite: Tier,
        volume_multiplier: u64,
        base_padding_bytes: u64,
    ) -> Result<Self, SizingError> {
        let Some(last) = tiers.last() else {
            return Err(SizingError::NoTiers);
        };
        for tier in tiers.iter().chain(std::iter::once(&expedite)) {
            if tier.max_threads == 0 {
                return Err(SizingError::ZeroThreads { class: tier.compute_class.clone() });
            }
        }
        for pair in tiers.windows(2) {
            if pair[1].max_files <= pair[0].max_files {
                return Err(SizingError::UnorderedFiles { class: pair[1].compute_class.clone() });
            }
            if pair[1].max_threads < pair[0].max_threads {
                return Err(SizingError::UnorderedThreads {
                    class: pair[1].compute_class.clone(),
                });
            }
        }
        if expedite.max_threads < last.max_threads {
            return Err(SizingError::UnorderedThreads { class: expedite.compute_class.clone() });
        }
        Ok(Self { tiers, expedite, volume_multiplier, base_padding_bytes })
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn expedite_tier(&self) -> &Tier {
        &self.expedite
    }

    pub fn volume_multiplier(&self) -> u64 {
        self.volume_multiplier
    }

    pub fn base_padding_bytes(&self) -> u64 {
        self.base_padding_bytes
    }

    /// Pick resources for a job with `file_count` inputs totalling
    /// `total_bytes`.
    pub fn decide(&self, file_count: usize, total_bytes: u64, expedite: bool) -> SizingDecision {
        let largest = self.tiers.last().unwrap_or(&self.expedite);
        let tier = if expedite && file_count > largest.max_files {
            &self.expedite
        } else {
            self.tiers.iter().find(|t| file_count <= t.max_files).unwrap_or(largest)
        };

        let count = u32::try_from(file_count).unwrap_or(u32::MAX);
        SizingDecision {
            compute_class: tier.compute_class.clone(),
            threads: count.clamp(1, tier.max_threads),
            volume_size_bytes: self
                .base_padding_bytes
                .saturating_add(self.volume_multiplier.saturating_mul(total_bytes)),
        }
    }
}

impl Default for SizingPolicy {
    fn default() -> Self {
        Self {
            tiers: vec![
                Tier::new("c4.large", 2, 2),
                Tier::new("c4.xlarge", 4, 4),
                Tier::new("c4.2xlarge", 8, 8),
                Tier::new("c4.4xlarge", 16, 16),
                Tier::new("c4.8xlarge", 36, 36),
            ],
            expedite: Tier::new("c5.18xlarge", usize::MAX, 72),
            volume_multiplier: 4,
            base_padding_bytes: 150 * GB,
        }
    }
}

#[cfg(test)]
#[path = "sizing_tests.rs"]
mod tests;
