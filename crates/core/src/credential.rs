// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job worker secret.

use rand::rngs::OsRng;
use rand::{CryptoRng, Rng, RngCore};
use std::fmt;

pub const DEFAULT_CREDENTIAL_LENGTH: usize = 15;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ!";

/// A generated secret. Only ever injected into the worker bootstrap; the
/// `Debug` output is redacted so it does not leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Fixed-length secret generator backed by a cryptographic RNG.
#[derive(Debug, Clone, Copy)]
pub struct CredentialGenerator {
    length: usize,
}

impl CredentialGenerator {
    pub fn new(length: usize) -> Self {
        Self { length: length.max(1) }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Generate a secret from the operating system's CSPRNG
    pub fn generate(&self) -> Credential {
        self.generate_with(&mut OsRng)
    }

    pub fn generate_with<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Credential {
        let secret = (0..self.length)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        Credential(secret)
    }
}

impl Default for CredentialGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CREDENTIAL_LENGTH)
    }
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
