//! # Auth Errors
//!
//! Error types for the authentication module.
//!
//! Every failure carries an [`AuthErrorKind`] and, where one exists, the
//! underlying cause. The `Display` output is the fixed message of the kind and
//! never includes the cause, so it is safe to hand to clients.

use std::error::Error as StdError;

use thiserror::Error;

use super::store::StoreError;

/// Boxed cause attached to an [`AuthError`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// What went wrong, independent of the cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorKind {
    /// The hashing primitive failed to produce a digest
    Hashing,

    /// The stored digest could not be compared against a password
    PasswordVerification,

    /// Email already registered
    DuplicateUser,

    /// Unknown email or wrong password (deliberately indistinguishable)
    InvalidCredentials,

    /// The token primitive failed to sign a claim set
    Signing,

    /// Token expired, tampered with, or malformed
    TokenVerification,

    /// The user store failed
    Storage,

    /// Invalid component configuration
    Config,
}

impl AuthErrorKind {
    /// The fixed, client-safe message for this kind.
    pub fn message(&self) -> &'static str {
        match self {
            AuthErrorKind::Hashing => "Error hashing",
            AuthErrorKind::PasswordVerification => "Error comparing passwords",
            AuthErrorKind::DuplicateUser => "User with this email already exists",
            AuthErrorKind::InvalidCredentials => "Invalid email or password",
            AuthErrorKind::Signing => "JWT signing failed",
            AuthErrorKind::TokenVerification => "JWT verification failed",
            AuthErrorKind::Storage => "Storage operation failed",
            AuthErrorKind::Config => "Invalid auth configuration",
        }
    }
}

/// Why a token was rejected, recovered from the attached cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    Expired,
    BadSignature,
    Malformed,
}

/// Authentication error: a kind plus an optional wrapped cause.
#[derive(Debug, Error)]
#[error("{}", .kind.message())]
pub struct AuthError {
    kind: AuthErrorKind,
    #[source]
    source: Option<BoxError>,
}

impl AuthError {
    /// An error with no underlying cause
    pub fn new(kind: AuthErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// An error wrapping the cause that triggered it
    pub fn with_source(kind: AuthErrorKind, source: impl Into<BoxError>) -> Self {
        Self {
            kind,
            source: Some(source.into()),
        }
    }

    pub fn duplicate_user() -> Self {
        Self::new(AuthErrorKind::DuplicateUser)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(AuthErrorKind::InvalidCredentials)
    }

    pub fn kind(&self) -> AuthErrorKind {
        self.kind
    }

    /// The wrapped cause, if any.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Full diagnostic text including the cause, for logs only.
    pub fn detail(&self) -> String {
        match &self.source {
            Some(source) => format!("{}: {}", self.kind.message(), source),
            None => self.kind.message().to_string(),
        }
    }

    /// For token verification failures, why the token was rejected.
    pub fn token_rejection(&self) -> Option<TokenRejection> {
        use jsonwebtoken::errors::ErrorKind;

        if self.kind != AuthErrorKind::TokenVerification {
            return None;
        }
        let jwt = self
            .source
            .as_ref()?
            .downcast_ref::<jsonwebtoken::errors::Error>()?;
        Some(match jwt.kind() {
            ErrorKind::ExpiredSignature => TokenRejection::Expired,
            ErrorKind::InvalidSignature => TokenRejection::BadSignature,
            _ => TokenRejection::Malformed,
        })
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self.kind {
            // 401 Unauthorized
            AuthErrorKind::InvalidCredentials => 401,
            AuthErrorKind::TokenVerification => 401,

            // 409 Conflict
            AuthErrorKind::DuplicateUser => 409,

            // 500 Internal Server Error
            AuthErrorKind::Hashing => 500,
            AuthErrorKind::PasswordVerification => 500,
            AuthErrorKind::Signing => 500,
            AuthErrorKind::Storage => 500,
            AuthErrorKind::Config => 500,
        }
    }

    /// Returns whether the caller, not the service, is at fault
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(_) => AuthError::with_source(AuthErrorKind::DuplicateUser, err),
            other => AuthError::with_source(AuthErrorKind::Storage, other),
        }
    }
}
