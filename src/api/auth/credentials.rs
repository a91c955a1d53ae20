//! The single admin identity, loaded once at process start.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(username: String, password: SecretString) -> Self {
        Self { username, password }
    }

    /// Compare a submitted pair against the stored one. Pure read, no error
    /// path: anything that is not an exact match is simply `false`.
    #[must_use]
    pub fn verify(&self, username: &str, password: &str) -> bool {
        // Both halves are always evaluated, and each compares fixed-length
        // digests rather than the raw strings, so the check does not
        // short-circuit on the first mismatched byte of caller input.
        digest_eq(username, &self.username) & digest_eq(password, self.password.expose_secret())
    }
}

fn digest_eq(left: &str, right: &str) -> bool {
    Sha256::digest(left.as_bytes()) == Sha256::digest(right.as_bytes())
}
