// ABOUTME: Process-wide request integrity token for state-changing operations
// ABOUTME: Generates a random token at startup and compares candidates in constant time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! CSRF protection module
//!
//! One token is issued per process. Clients read it from the configuration
//! document and echo it back on every state-changing request.

use rand::Rng;
use subtle::ConstantTimeEq;

use crate::errors::{AppError, AppResult};

/// CSRF token length in bytes (32 bytes = 256 bits)
const CSRF_TOKEN_LENGTH: usize = 32;

/// Holder of the process token
#[derive(Clone)]
pub struct CsrfTokenManager {
    token: String,
}

impl CsrfTokenManager {
    /// Manager with a freshly generated token
    #[must_use]
    pub fn new() -> Self {
        let random_bytes: Vec<u8> = (0..CSRF_TOKEN_LENGTH)
            .map(|_| rand::thread_rng().gen())
            .collect();
        Self {
            token: hex::encode(random_bytes),
        }
    }

    /// Manager with a configured token
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Token handed to clients
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Check a token presented by a client
    ///
    /// # Errors
    ///
    /// Returns `SecurityViolation` when the token is missing or does not match
    pub fn validate_token(&self, candidate: Option<&str>) -> AppResult<()> {
        let Some(candidate) = candidate else {
            return Err(AppError::security("Missing CSRF token"));
        };
        if bool::from(self.token.as_bytes().ct_eq(candidate.as_bytes())) {
            Ok(())
        } else {
            Err(AppError::security("Invalid CSRF token"))
        }
    }
}

impl Default for CsrfTokenManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CsrfTokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfTokenManager")
            .field("token", &"[REDACTED]")
            .finish()
    }
}
