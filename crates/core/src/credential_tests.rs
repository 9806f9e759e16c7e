// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[yare::parameterized(
    default_len = { DEFAULT_CREDENTIAL_LENGTH },
    short       = { 4 },
    long        = { 64 },
)]
fn generated_secret_has_requested_length(length: usize) {
    let secret = CredentialGenerator::new(length).generate();
    assert_eq!(secret.expose().chars().count(), length);
}

#[test]
fn zero_length_is_raised_to_one() {
    assert_eq!(CredentialGenerator::new(0).length(), 1);
}

#[test]
fn secret_uses_alphabet_only() {
    let secret = CredentialGenerator::new(512).generate();
    assert!(secret.expose().bytes().all(|b| ALPHABET.contains(&b)));
}

#[test]
fn seeded_generation_is_reproducible() {
    let generator = CredentialGenerator::default();
    let a = generator.generate_with(&mut StdRng::seed_from_u64(7));
    let b = generator.generate_with(&mut StdRng::seed_from_u64(7));
    let c = generator.generate_with(&mut StdRng::seed_from_u64(8));
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn successive_secrets_differ() {
    let generator = CredentialGenerator::default();
    assert_ne!(generator.generate(), generator.generate());
}

#[test]
fn debug_output_is_redacted() {
    let secret = Credential::new("hunter2hunter2");
    let debug = format!("{secret:?}");
    assert!(!debug.contains("hunter2"));
}

#[test]
fn draws_cover_the_alphabet() {
    let mut rng = StdRng::seed_from_u64(42);
    let secret = CredentialGenerator::new(20_000).generate_with(&mut rng);
    for b in ALPHABET {
        assert!(secret.expose().as_bytes().contains(b), "missing {}", *b as char);
    }
}
