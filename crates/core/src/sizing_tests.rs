// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

const MB: u64 = 1_000_000;

fn tier_index(policy: &SizingPolicy, class: &str) -> usize {
    policy
        .tiers()
        .iter()
        .chain(std::iter::once(policy.expedite_tier()))
        .position(|t| t.compute_class == class)
        .unwrap()
}

#[yare::parameterized(
    one         = { 1,   "c4.large",   1 },
    two         = { 2,   "c4.large",   2 },
    three       = { 3,   "c4.xlarge",  3 },
    four        = { 4,   "c4.xlarge",  4 },
    eight       = { 8,   "c4.2xlarge", 8 },
    nine        = { 9,   "c4.4xlarge", 9 },
    sixteen     = { 16,  "c4.4xlarge", 16 },
    seventeen   = { 17,  "c4.8xlarge", 17 },
    thirty_six  = { 36,  "c4.8xlarge", 36 },
    clipped     = { 100, "c4.8xlarge", 36 },
)]
fn default_tiers(files: usize, class: &str, threads: u32) {
    let decision = SizingPolicy::default().decide(files, 0, false);
    assert_eq!(decision.compute_class, class);
    assert_eq!(decision.threads, threads);
}

#[yare::parameterized(
    below_ceiling = { 20,  "c4.8xlarge",  20 },
    at_ceiling    = { 36,  "c4.8xlarge",  36 },
    above_ceiling = { 50,  "c5.18xlarge", 50 },
    huge          = { 500, "c5.18xlarge", 72 },
)]
fn expedite_unlocks_extra_large_tier(files: usize, class: &str, threads: u32) {
    let decision = SizingPolicy::default().decide(files, 0, true);
    assert_eq!(decision.compute_class, class);
    assert_eq!(decision.threads, threads);
}

#[test]
fn zero_files_still_gets_one_thread() {
    let decision = SizingPolicy::default().decide(0, 0, false);
    assert_eq!(decision.compute_class, "c4.large");
    assert_eq!(decision.threads, 1);
}

#[test]
fn volume_is_padding_plus_multiplied_input() {
    let decision = SizingPolicy::default().decide(3, 25 * MB, false);
    assert_eq!(decision.volume_size_bytes, 150 * GB + 4 * 25 * MB);
    assert_eq!(decision.volume_size_gb(), 151);
}

#[test]
fn volume_gb_is_exact_on_boundaries() {
    let decision = SizingPolicy::default().decide(1, 0, false);
    assert_eq!(decision.volume_size_gb(), 150);
}

#[test]
fn policy_rejects_empty_tiers() {
    let err = SizingPolicy::new(vec![], Tier::new("x", 1, 1), 4, 0).unwrap_err();
    assert_eq!(err, SizingError::NoTiers);
}

#[test]
fn policy_rejects_unordered_file_counts() {
    let err = SizingPolicy::new(
        vec![Tier::new("a", 4, 4), Tier::new("b", 2, 8)],
        Tier::new("x", usize::MAX, 8),
        4,
        0,
    )
    .unwrap_err();
    assert_eq!(err, SizingError::UnorderedFiles { class: "b".to_string() });
}

#[test]
fn policy_rejects_shrinking_threads() {
    let err = SizingPolicy::new(
        vec![Tier::new("a", 2, 8), Tier::new("b", 4, 4)],
        Tier::new("x", usize::MAX, 8),
        4,
        0,
    )
    .unwrap_err();
    assert_eq!(err, SizingError::UnorderedThreads { class: "b".to_string() });
}

#[test]
fn policy_rejects_small_expedite_tier() {
    let err = SizingPolicy::new(vec![Tier::new("a", 2, 8)], Tier::new("x", 9, 4), 4, 0)
        .unwrap_err();
    assert_eq!(err, SizingError::UnorderedThreads { class: "x".to_string() });
}

#[test]
fn policy_rejects_zero_threads() {
    let err = SizingPolicy::new(vec![Tier::new("a", 2, 0)], Tier::new("x", 9, 4), 4, 0)
        .unwrap_err();
    assert_eq!(err, SizingError::ZeroThreads { class: "a".to_string() });
}

proptest! {
    #[test]
    fn decide_is_deterministic(files in 0usize..200, bytes in 0u64..(1 << 40), expedite: bool) {
        let policy = SizingPolicy::default();
        prop_assert_eq!(policy.decide(files, bytes, expedite), policy.decide(files, bytes, expedite));
    }

    #[test]
    fn tiers_are_monotonic_in_file_count(a in 0usize..200, b in 0usize..200, expedite: bool) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let policy = SizingPolicy::default();
        let small = policy.decide(lo, 0, expedite);
        let large = policy.decide(hi, 0, expedite);
        prop_assert!(tier_index(&policy, &small.compute_class) <= tier_index(&policy, &large.compute_class));
        prop_assert!(small.threads <= large.threads);
    }

    #[test]
    fn threads_never_exceed_file_count_or_ceiling(files in 1usize..500, expedite: bool) {
        let policy = SizingPolicy::default();
        let decision = policy.decide(files, 0, expedite);
        let ceiling = if expedite { 72 } else { 36 };
        prop_assert!(decision.threads as usize <= files);
        prop_assert!(decision.threads <= ceiling);
    }

    #[test]
    fn volume_grows_with_input_size(a in 0u64..(1 << 40), b in 0u64..(1 << 40)) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let policy = SizingPolicy::default();
        prop_assert!(policy.decide(1, lo, false).volume_size_bytes <= policy.decide(1, hi, false).volume_size_bytes);
    }
}
