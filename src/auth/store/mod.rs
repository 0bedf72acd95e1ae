//! # User Store
//!
//! Storage interface for user records and its backends.
//!
//! The email column carries a unique constraint in every backend. That
//! constraint, not a read-before-write check, is what guarantees no two
//! users share an email: a violating insert fails with
//! [`StoreError::UniqueViolation`].

mod memory;
#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "sqlite")]
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::user::User;

pub use memory::InMemoryUserStore;
#[cfg(feature = "postgres")]
pub use postgres::PgUserStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteUserStore;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique column (email or id) already holds this value
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// A stored row could not be mapped back to a user
    #[error("corrupt user row: {0}")]
    Corrupt(String),

    /// No backend is compiled in for this connection string
    #[error("unsupported database url scheme: {0}")]
    UnsupportedUrl(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::UniqueViolation(db.message().to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// User store trait
///
/// Abstracts storage operations for users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create the `users` table if it does not exist
    async fn migrate(&self) -> StoreResult<()>;

    /// Find a user by exact email match
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Find a user by their ID
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Persist a new user and return the stored row
    async fn insert(&self, user: &User) -> StoreResult<User>;
}

/// Store connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// `memory`, `sqlite:...` or `postgres://...`
    pub url: String,

    /// Upper bound on pooled connections
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://warden.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// URL scheme without credentials, safe to log
    pub fn scheme(&self) -> &str {
        self.url.split(':').next().unwrap_or_default()
    }
}

/// Open the backend selected by the URL scheme
pub async fn connect_store(config: &DatabaseConfig) -> StoreResult<Arc<dyn UserStore>> {
    match config.scheme() {
        "memory" => Ok(Arc::new(InMemoryUserStore::new())),

        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Arc::new(SqliteUserStore::connect(config).await?)),

        #[cfg(feature = "postgres")]
        "postgres" | "postgresql" => Ok(Arc::new(PgUserStore::connect(config).await?)),

        other => Err(StoreError::UnsupportedUrl(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme() {
        assert_eq!(DatabaseConfig::new("sqlite::memory:").scheme(), "sqlite");
        assert_eq!(
            DatabaseConfig::new("postgres://app:hunter2@db/app").scheme(),
            "postgres"
        );
        assert_eq!(DatabaseConfig::new("memory").scheme(), "memory");
    }

    #[tokio::test]
    async fn test_connect_memory() {
        let store = connect_store(&DatabaseConfig::new("memory")).await.unwrap();
        store.migrate().await.unwrap();
        assert!(store.find_by_email("a@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unsupported_scheme() {
        let err = connect_store(&DatabaseConfig::new("mysql://root@localhost/app"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::UnsupportedUrl(ref s) if s == "mysql"));
        assert!(!err.to_string().contains("root"));
    }
}
