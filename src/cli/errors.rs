//! CLI-specific error types
//!
//! Every CLI error is fatal: main prints it to stderr and exits non-zero.

use std::fmt;
use std::io;

use crate::auth::{AuthError, StoreError};
use crate::config::ConfigError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Environment configuration error
    ConfigError,
    /// Store could not be opened or migrated
    StoreError,
    /// An auth operation was refused or failed
    AuthFailed,
    /// I/O error (stdout)
    IoError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "WARDEN_CLI_CONFIG_ERROR",
            Self::StoreError => "WARDEN_CLI_STORE_ERROR",
            Self::AuthFailed => "WARDEN_CLI_AUTH_FAILED",
            Self::IoError => "WARDEN_CLI_IO_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn store_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::StoreError, msg)
    }

    pub fn auth_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::AuthFailed, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        Self::store_error(e.to_string())
    }
}

/// Only the client-safe message is surfaced; the cause was already logged.
impl From<AuthError> for CliError {
    fn from(e: AuthError) -> Self {
        Self::auth_failed(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthErrorKind;

    #[test]
    fn test_display_includes_code() {
        let err = CliError::config_error("bad ttl");
        assert_eq!(err.to_string(), "WARDEN_CLI_CONFIG_ERROR: bad ttl");
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_auth_error_hides_cause() {
        let cause = StoreError::Corrupt("secret table layout".into());
        let err: CliError = AuthError::with_source(AuthErrorKind::Storage, cause).into();
        assert_eq!(err.code_str(), "WARDEN_CLI_AUTH_FAILED");
        assert_eq!(err.message(), "Storage operation failed");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: CliError = ConfigError::Invalid {
            key: "JWT_EXPIRATION",
            value: "soon".into(),
            reason: "unrecognized duration".into(),
        }
        .into();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
        assert!(err.message().contains("JWT_EXPIRATION"));
    }
}
