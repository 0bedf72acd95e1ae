use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, UserStore};
use crate::auth::user::User;

/// In-memory user store for tests and throwaway runs
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn migrate(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: &User) -> StoreResult<User> {
        let mut users = self.users.write().await;

        // Checked under the write lock, so concurrent inserts cannot both pass
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation("users.email".to_string()));
        }
        if users.iter().any(|u| u.id == user.id) {
            return Err(StoreError::UniqueViolation("users.id".to_string()));
        }

        users.push(user.clone());
        Ok(user.clone())
    }
}
