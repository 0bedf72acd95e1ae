use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use super::{DatabaseConfig, StoreError, StoreResult, UserStore};
use crate::auth::user::{User, UserRole};

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id          UUID PRIMARY KEY,
    name        VARCHAR(255) NOT NULL,
    email       VARCHAR(255) NOT NULL UNIQUE,
    password    VARCHAR(255) NOT NULL,
    role        VARCHAR(50) NOT NULL DEFAULT 'user',
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const FIND_BY_EMAIL: &str =
    "SELECT id, name, email, password, role, created_at FROM users WHERE email = $1 LIMIT 1";

const FIND_BY_ID: &str =
    "SELECT id, name, email, password, role, created_at FROM users WHERE id = $1 LIMIT 1";

const INSERT_USER: &str = "INSERT INTO users (id, name, email, password, role, created_at) \
     VALUES ($1, $2, $3, $4, $5, $6) \
     RETURNING id, name, email, password, role, created_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<UserRole>()
            .map_err(|e| StoreError::Corrupt(format!("user {}: {e}", row.id)))?;

        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_digest: row.password,
            role,
            created_at: row.created_at,
        })
    }
}

/// PostgreSQL-backed user store
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl UserStore for PgUserStore {
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
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    /// Returns the row as stored; `created_at` comes back at microsecond
    /// precision.
    async fn insert(&self, user: &User) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(INSERT_USER)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_digest)
            .bind(user.role.as_str())
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await?;
        User::try_from(row)
    }
}
