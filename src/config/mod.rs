//! Process configuration
//!
//! Read once by the bootstrap and handed to each component explicitly.
//! Nothing else in the crate looks at the environment.
//!
//! | Variable                   | Default                        |
//! |----------------------------|--------------------------------|
//! | `JWT_SECRET`               | `your_jwt_secret` (insecure)   |
//! | `JWT_EXPIRATION`           | `1d`                           |
//! | `DATABASE_URL`             | `sqlite://warden.db?mode=rwc`  |
//! | `DATABASE_MAX_CONNECTIONS` | `5`                            |
//! | `HASH_MEMORY_KIB`          | `19456`                        |
//! | `HASH_ITERATIONS`          | `2`                            |
//! | `HASH_PARALLELISM`         | `1`                            |

pub mod duration;

use std::str::FromStr;

use chrono::Duration;
use thiserror::Error;

use crate::auth::{DatabaseConfig, HasherConfig, TokenConfig};

pub use duration::{parse_duration, parse_millis};

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Everything the bootstrap needs to wire the components
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub token: TokenConfig,
    pub hasher: HasherConfig,
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Unset keys fall back to defaults; set but empty keys are treated as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let mut config = AppConfig::default();

        if let Some(secret) = get("JWT_SECRET") {
            config.token.secret = secret;
        }
        if let Some(raw) = get("JWT_EXPIRATION") {
            config.token.ttl = parse_ttl(&raw)?;
        }

        if let Some(url) = get("DATABASE_URL") {
            config.database.url = url;
        }
        if let Some(raw) = get("DATABASE_MAX_CONNECTIONS") {
            config.database.max_connections = parse_positive("DATABASE_MAX_CONNECTIONS", &raw)?;
        }

        if let Some(raw) = get("HASH_MEMORY_KIB") {
            config.hasher.memory_kib = parse_positive("HASH_MEMORY_KIB", &raw)?;
        }
        if let Some(raw) = get("HASH_ITERATIONS") {
            config.hasher.iterations = parse_positive("HASH_ITERATIONS", &raw)?;
        }
        if let Some(raw) = get("HASH_PARALLELISM") {
            config.hasher.parallelism = parse_positive("HASH_PARALLELISM", &raw)?;
        }

        Ok(config)
    }
}

/// Longest accepted token lifetime: 100 years of 365.25 days.
const MAX_TTL_DAYS: i64 = 36_525;

/// Token lifetimes shorter than one second would expire at issue time.
fn parse_ttl(raw: &str) -> Result<Duration, ConfigError> {
    let ttl = parse_duration(raw)
        .ok_or_else(|| ConfigError::invalid("JWT_EXPIRATION", raw, "unrecognized duration"))?;
    if ttl < Duration::seconds(1) {
        return Err(ConfigError::invalid(
            "JWT_EXPIRATION",
            raw,
            "must be at least one second",
        ));
    }
    if ttl > Duration::days(MAX_TTL_DAYS) {
        return Err(ConfigError::invalid(
            "JWT_EXPIRATION",
            raw,
            "must be at most 100 years",
        ));
    }
    Ok(ttl)
}

fn parse_positive<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
{
    let value: T = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(key, raw, "not a number"))?;
    if value <= T::default() {
        return Err(ConfigError::invalid(key, raw, "must be greater than zero"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.token.secret, "your_jwt_secret");
        assert!(config.token.uses_placeholder_secret());
        assert_eq!(config.token.ttl, Duration::days(1));
        assert_eq!(config.database.url, "sqlite://warden.db?mode=rwc");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.hasher.iterations, 2);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("JWT_EXPIRATION", "12h"),
            ("DATABASE_URL", "postgres://localhost/app"),
            ("DATABASE_MAX_CONNECTIONS", "20"),
            ("HASH_MEMORY_KIB", "8192"),
            ("HASH_ITERATIONS", "3"),
            ("HASH_PARALLELISM", "2"),
        ]))
        .unwrap();

        assert_eq!(config.token.secret, "s3cret");
        assert!(!config.token.uses_placeholder_secret());
        assert_eq!(config.token.ttl, Duration::hours(12));
        assert_eq!(config.database.url, "postgres://localhost/app");
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.hasher.memory_kib, 8192);
        assert_eq!(config.hasher.iterations, 3);
        assert_eq!(config.hasher.parallelism, 2);
    }

    #[test]
    fn test_empty_value_means_unset() {
        let config = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "")])).unwrap();
        assert!(config.token.uses_placeholder_secret());
    }

    #[test]
    fn test_invalid_expiration() {
        let err = AppConfig::from_lookup(lookup(&[("JWT_EXPIRATION", "forever")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "JWT_EXPIRATION", .. }));

        // A bare number is milliseconds, so this is half a second
        let err = AppConfig::from_lookup(lookup(&[("JWT_EXPIRATION", "500")])).unwrap_err();
        assert!(err.to_string().contains("at least one second"));

        assert!(AppConfig::from_lookup(lookup(&[("JWT_EXPIRATION", "-1d")])).is_err());
    }

    #[test]
    fn test_expiration_upper_bound() {
        let err =
            AppConfig::from_lookup(lookup(&[("JWT_EXPIRATION", "1000000y")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "JWT_EXPIRATION", .. }));
        assert!(err.to_string().contains("at most 100 years"));

        let config = AppConfig::from_lookup(lookup(&[("JWT_EXPIRATION", "100y")])).unwrap();
        assert!(config.token.ttl <= Duration::days(MAX_TTL_DAYS));
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(AppConfig::from_lookup(lookup(&[("HASH_ITERATIONS", "0")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("HASH_MEMORY_KIB", "lots")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("DATABASE_MAX_CONNECTIONS", "-3")])).is_err());
    }
}
