use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

use super::{DatabaseConfig, StoreError, StoreResult, UserStore};
use crate::auth::user::{User, UserRole};

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id          TEXT PRIMARY KEY NOT NULL,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE,
    password    TEXT NOT NULL,
    role        TEXT NOT NULL DEFAULT 'user',
    created_at  TEXT NOT NULL
)
"#;

const FIND_BY_EMAIL: &str =
    "SELECT id, name, email, password, role, created_at FROM users WHERE email = ? LIMIT 1";

const FIND_BY_ID: &str =
    "SELECT id, name, email, password, role, created_at FROM users WHERE id = ? LIMIT 1";

const INSERT_USER: &str =
    "INSERT INTO users (id, name, email, password, role, created_at) VALUES (?, ?, ?, ?, ?, ?)";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    password: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| StoreError::Corrupt(format!("id {:?}: {e}", row.id)))?;
        let role = row
            .role
            .parse::<UserRole>()
            .map_err(|e| StoreError::Corrupt(format!("user {id}: {e}")))?;

        Ok(User {
            id,
            name: row.name,
            email: row.email,
            password_digest: row.password,
            role,
            created_at: row.created_at,
        })
    }
}

/// SQLite-backed user store
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    /// Open a pool for `config.url`.
    ///
    /// An in-memory database lives and dies with its connection, so
    /// `:memory:` URLs get a single connection that is never recycled.
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)?;

        let pool = if config.url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .connect_with(options)
                .await?
        };

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(CREATE_USERS).execute(&self.pool).await?;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(FIND_BY_EMAIL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(FIND_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn insert(&self, user: &User) -> StoreResult<User> {
        sqlx::query(INSERT_USER)
            .bind(user.id.to_string())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_digest)
            .bind(user.role.as_str())
            .bind(user.created_at)
            .execute(&self.pool)
            .await?;

        Ok(user.clone())
    }
}
