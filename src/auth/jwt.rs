//! # Session Tokens
//!
//! Signing and verification of compact HS256 bearer tokens.
//!
//! ## Invariants
//! - Stateless validation (no store lookup)
//! - Every token carries `iat` and `exp`; `exp = iat + ttl`
//! - Expiry is checked with zero leeway
//! - No secrets in tokens (identity and role only)

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::errors::{AuthError, AuthErrorKind, AuthResult};
use super::user::{AuthenticatedUser, RegisteredUser, UserRole};
use crate::observability::LogSink;

/// Secret used when none is configured. Tokens signed with it are forgeable.
pub const PLACEHOLDER_SECRET: &str = "your_jwt_secret";

/// Claim set handed to [`TokenIssuer::sign`]
pub type Claims = Map<String, Value>;

/// Token issuer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    /// HMAC signing key
    pub secret: String,

    /// Token lifetime
    pub ttl: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: PLACEHOLDER_SECRET.to_string(),
            ttl: Duration::days(1),
        }
    }
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    pub fn uses_placeholder_secret(&self) -> bool {
        self.secret == PLACEHOLDER_SECRET
    }
}

/// Identity claims signed after login or registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl From<&AuthenticatedUser> for SessionClaims {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}

impl From<&RegisteredUser> for SessionClaims {
    fn from(user: &RegisteredUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Signs and verifies session tokens
#[derive(Clone)]
pub struct TokenIssuer {
    ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    log: Arc<dyn LogSink>,
}

impl TokenIssuer {
    /// Create a new issuer with the given configuration
    pub fn new(config: &TokenConfig, log: Arc<dyn LogSink>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            ttl: config.ttl,
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            log,
        }
    }

    /// Sign `claims`, adding `iat` (now) and `exp` (now + ttl).
    ///
    /// A claim set that already carries `exp` is rejected: the lifetime is
    /// owned by the issuer.
    pub fn sign(&self, claims: Claims) -> AuthResult<String> {
        self.sign_at(claims, Utc::now())
    }

    fn sign_at(&self, mut claims: Claims, issued_at: DateTime<Utc>) -> AuthResult<String> {
        if claims.contains_key("exp") {
            self.log.error(
                "token_sign_failed",
                &[("error", "claims already contain an exp property")],
            );
            return Err(AuthError::new(AuthErrorKind::Signing));
        }

        let expires_at = issued_at.checked_add_signed(self.ttl).ok_or_else(|| {
            self.log.error(
                "token_sign_failed",
                &[("error", "token lifetime overflows the expiry timestamp")],
            );
            AuthError::new(AuthErrorKind::Signing)
        })?;

        let iat = issued_at.timestamp();
        let exp = expires_at.timestamp();
        claims.insert("iat".to_string(), Value::from(iat));
        claims.insert("exp".to_string(), Value::from(exp));

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            self.log.error("token_sign_failed", &[("error", &e.to_string())]);
            AuthError::with_source(AuthErrorKind::Signing, e)
        })
    }

    /// Validate signature and expiry, returning every embedded claim
    /// (including `iat` and `exp`).
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                self.log.error("token_verify_failed", &[("error", &e.to_string())]);
                AuthError::with_source(AuthErrorKind::TokenVerification, e)
            })
    }

    /// Sign the identity claims of a user
    pub fn issue(&self, claims: &SessionClaims) -> AuthResult<String> {
        self.sign_serialized(claims)
    }

    /// Sign any value that serializes to a JSON object
    fn sign_serialized<T: Serialize>(&self, claims: &T) -> AuthResult<String> {
        match serde_json::to_value(claims) {
            Ok(Value::Object(map)) => self.sign(map),
            Ok(_) => {
                self.log.error("token_sign_failed", &[("error", "claims are not a JSON object")]);
                Err(AuthError::new(AuthErrorKind::Signing))
            }
            Err(e) => {
                self.log.error("token_sign_failed", &[("error", &e.to_string())]);
                Err(AuthError::with_source(AuthErrorKind::Signing, e))
            }
        }
    }

    /// Verify a token and read back the identity claims it carries
    pub fn verify_session(&self, token: &str) -> AuthResult<SessionClaims> {
        let claims = self.verify(token)?;
        serde_json::from_value(Value::Object(claims)).map_err(|e| {
            self.log.error("token_verify_failed", &[("error", &e.to_string())]);
            AuthError::with_source(AuthErrorKind::TokenVerification, e)
        })
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
