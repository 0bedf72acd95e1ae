//! # Credential Hasher
//!
//! Password hashing and verification.
//!
//! ## Invariants
//! - Passwords are only stored as Argon2id PHC strings
//! - Digest comparison is constant-time (provided by the `argon2` crate)
//! - Failures are logged with detail; callers only see the fixed message

use std::sync::Arc;

use argon2::{
    password_hash::{
        rand_core::OsRng, Error as PasswordHashError, PasswordHash, PasswordHasher,
        PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

use super::errors::{AuthError, AuthErrorKind, AuthResult};
use crate::observability::LogSink;

/// Argon2id work factor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HasherConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,

    /// Number of passes over memory
    pub iterations: u32,

    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HasherConfig {
    /// The cheapest parameters Argon2 accepts. Only for tests.
    pub fn insecure_fast() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST.max(8),
            iterations: 1,
            parallelism: 1,
        }
    }

    fn params(&self) -> Result<Params, argon2::Error> {
        Params::new(self.memory_kib, self.iterations, self.parallelism, None)
    }
}

/// Computes and verifies salted password digests
#[derive(Clone)]
pub struct CredentialHasher {
    params: Params,
    log: Arc<dyn LogSink>,
}

impl CredentialHasher {
    /// Create a hasher; fails if the work factor is out of Argon2's range
    pub fn new(config: &HasherConfig, log: Arc<dyn LogSink>) -> AuthResult<Self> {
        let params = config.params().map_err(|e| {
            log.error("hasher_config_invalid", &[("error", &e.to_string())]);
            AuthError::with_source(AuthErrorKind::Config, e)
        })?;
        Ok(Self { params, log })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                self.log.error("password_hash_failed", &[("error", &e.to_string())]);
                AuthError::with_source(AuthErrorKind::Hashing, e)
            })
    }

    /// Verify a password against a stored digest.
    ///
    /// A mismatch is `Ok(false)`; a digest that cannot be parsed or evaluated
    /// is an error.
    pub fn verify(&self, password: &str, digest: &str) -> AuthResult<bool> {
        let failed = |e: PasswordHashError| {
            self.log.error("password_compare_failed", &[("error", &e.to_string())]);
            AuthError::with_source(AuthErrorKind::PasswordVerification, e)
        };

        let parsed = PasswordHash::new(digest).map_err(failed)?;

        // Parameters and salt come from the digest, not from self.params
        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(PasswordHashError::Password) => Ok(false),
            Err(e) => Err(failed(e)),
        }
    }

    /// [`hash`](Self::hash) on the blocking pool
    pub async fn spawn_hash(&self, password: String) -> AuthResult<String> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| {
                self.log.error("password_hash_failed", &[("error", &e.to_string())]);
                AuthError::with_source(AuthErrorKind::Hashing, e)
            })?
    }

    /// [`verify`](Self::verify) on the blocking pool
    pub async fn spawn_verify(&self, password: String, digest: String) -> AuthResult<bool> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| {
                self.log.error("password_compare_failed", &[("error", &e.to_string())]);
                AuthError::with_source(AuthErrorKind::PasswordVerification, e)
            })?
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
