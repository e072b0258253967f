//! Admission tokens
//!
//! A token is a pure function of `(queue, user_id)`: the SHA-256 digest of
//! `user-queue-{queue}-{user_id}`, hex encoded. Nothing is stored; verification
//! re-derives the digest and compares.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Lifetime of the client-side credential carrying the token (5 minutes)
pub const TOKEN_MAX_AGE_SECS: u64 = 300;

/// Path scope of the client-side credential
pub const TOKEN_COOKIE_PATH: &str = "/";

// Known-answer vector for SHA-256("abc")
const SELF_TEST_INPUT: &[u8] = b"abc";
const SELF_TEST_DIGEST: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

/// Derives and checks admission tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenGenerator;

impl TokenGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Check the digest implementation against a known answer.
    ///
    /// Run once at boot; a failure means tokens cannot be trusted and the
    /// process must not serve.
    pub fn self_test(&self) -> Result<()> {
        let digest = hex::encode(Sha256::digest(SELF_TEST_INPUT));
        if digest != SELF_TEST_DIGEST {
            return Err(AppError::Configuration(format!(
                "SHA-256 known-answer test failed: got {digest}"
            )));
        }
        Ok(())
    }

    /// Token for `user_id` in `queue` (64 lowercase hex chars)
    pub fn generate(&self, queue: &str, user_id: &str) -> String {
        let input = format!("user-queue-{queue}-{user_id}");
        hex::encode(Sha256::digest(input.as_bytes()))
    }

    /// True if `supplied` is the token this system issues for `(queue, user_id)`.
    ///
    /// Comparison is case-insensitive. Admission state is not consulted.
    pub fn verify(&self, queue: &str, user_id: &str, supplied: &str) -> bool {
        self.generate(queue, user_id).eq_ignore_ascii_case(supplied)
    }

    /// Token plus the credential binding the HTTP layer should apply
    pub fn bind(&self, queue: &str, user_id: &str) -> TokenBinding {
        TokenBinding {
            token: self.generate(queue, user_id),
            cookie_name: cookie_name(queue),
            max_age_secs: TOKEN_MAX_AGE_SECS,
            path: TOKEN_COOKIE_PATH.to_string(),
        }
    }
}

/// Name of the client-side credential for `queue`
pub fn cookie_name(queue: &str) -> String {
    format!("user-queue-{queue}-token")
}

/// Issued token and how it should be carried by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBinding {
    pub token: String,
    pub cookie_name: String,
    pub max_age_secs: u64,
    pub path: String,
}
