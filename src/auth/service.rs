//! # User Store Gateway
//!
//! Registration and credential login on top of a [`UserStore`].
//!
//! ## Invariants
//! - No two users share an email (enforced by the store's unique constraint)
//! - Unknown email and wrong password fail with the same error
//! - Passwords and digests never appear in results or logs

use std::sync::Arc;

use super::crypto::CredentialHasher;
use super::errors::{AuthError, AuthResult};
use super::store::UserStore;
use super::user::{AuthenticatedUser, Credentials, NewUser, RegisteredUser, User};
use crate::observability::LogSink;

/// Creates and authenticates users
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: CredentialHasher,
    log: Arc<dyn LogSink>,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, hasher: CredentialHasher, log: Arc<dyn LogSink>) -> Self {
        Self { store, hasher, log }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    /// Register a new user.
    ///
    /// Fails with `DuplicateUser` if the email is taken, whether that is seen
    /// by the lookup or only by the insert.
    pub async fn create_user(&self, input: NewUser) -> AuthResult<RegisteredUser> {
        let email = input.email.clone();
        match self.try_create(input).await {
            Ok(user) => {
                self.log.info(
                    "user_created",
                    &[("user_id", &user.id.to_string()), ("email", &user.email)],
                );
                Ok(user)
            }
            Err(err) => {
                self.report("user_create_failed", &email, &err);
                Err(err)
            }
        }
    }

    async fn try_create(&self, input: NewUser) -> AuthResult<RegisteredUser> {
        // Skips a wasted hash; the insert below is what actually decides
        if self.store.find_by_email(&input.email).await?.is_some() {
            return Err(AuthError::duplicate_user());
        }

        let digest = self.hasher.spawn_hash(input.password).await?;
        let user = User::new(input.name, input.email, digest, input.role);
        let stored = self.store.insert(&user).await?;

        Ok(RegisteredUser::from(stored))
    }

    /// Check an email/password pair.
    pub async fn authenticate_user(&self, credentials: Credentials) -> AuthResult<AuthenticatedUser> {
        let email = credentials.email.clone();
        match self.try_authenticate(credentials).await {
            Ok(user) => {
                self.log.info(
                    "user_authenticated",
                    &[("user_id", &user.id.to_string()), ("email", &user.email)],
                );
                Ok(user)
            }
            Err(err) => {
                self.report("user_authenticate_failed", &email, &err);
                Err(err)
            }
        }
    }

    async fn try_authenticate(&self, credentials: Credentials) -> AuthResult<AuthenticatedUser> {
        let user = self
            .store
            .find_by_email(&credentials.email)
            .await?
            .ok_or_else(AuthError::invalid_credentials)?;

        let matches = self
            .hasher
            .spawn_verify(credentials.password, user.password_digest.clone())
            .await?;
        if !matches {
            return Err(AuthError::invalid_credentials());
        }

        Ok(AuthenticatedUser::from(user))
    }

    fn report(&self, event: &str, email: &str, err: &AuthError) {
        let detail = err.detail();
        self.log.error(event, &[("email", email), ("error", detail.as_str())]);
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("hasher", &self.hasher)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::crypto::HasherConfig;
    use crate::auth::errors::AuthErrorKind;
    use crate::auth::store::{InMemoryUserStore, StoreError, StoreResult};
    use crate::auth::user::UserRole;
    use crate::observability::{MemorySink, Severity};
    use async_trait::async_trait;
    use uuid::Uuid;

    fn service_with(store: Arc<dyn UserStore>) -> (AuthService, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let hasher = CredentialHasher::new(&HasherConfig::insecure_fast(), sink.clone()).unwrap();
        (AuthService::new(store, hasher, sink.clone()), sink)
    }

    fn service() -> (AuthService, Arc<MemorySink>) {
        service_with(Arc::new(InMemoryUserStore::new()))
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (service, _) = service();

        let created = service
            .create_user(NewUser::new("Ana", "a@x.com", "pw123456"))
            .await
            .unwrap();
        assert_eq!(created.name, "Ana");
        assert_eq!(created.email, "a@x.com");
        assert_eq!(created.role, UserRole::User);

        let logged_in = service
            .authenticate_user(Credentials::new("a@x.com", "pw123456"))
            .await
            .unwrap();
        assert_eq!(logged_in.id, created.id);
        assert_eq!(logged_in.name, "Ana");
        assert_eq!(logged_in.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_digest_is_stored_not_password() {
        let (service, _) = service();
        let created = service
            .create_user(NewUser::new("Ana", "a@x.com", "pw123456"))
            .await
            .unwrap();

        let stored = service.store().find_by_id(created.id).await.unwrap().unwrap();
        assert_ne!(stored.password_digest, "pw123456");
        assert!(stored.password_digest.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let (service, sink) = service();
        service
            .create_user(NewUser::new("Ana", "a@x.com", "pw123456"))
            .await
            .unwrap();

        let err = service
            .create_user(NewUser::new("Other", "a@x.com", "different"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), AuthErrorKind::DuplicateUser);
        assert_eq!(err.to_string(), "User with this email already exists");

        let failure = sink
            .records()
            .into_iter()
            .find(|r| r.event == "user_create_failed")
            .unwrap();
        assert_eq!(failure.severity, Severity::Error);
        assert_eq!(failure.field("email"), Some("a@x.com"));
        assert_eq!(
            failure.field("error"),
            Some("User with this email already exists")
        );
    }

    #[tokio::test]
    async fn test_admin_role_preserved() {
        let (service, _) = service();
        let created = service
            .create_user(NewUser::new("Root", "root@x.com", "pw123456").with_role(UserRole::Admin))
            .await
            .unwrap();
        assert_eq!(created.role, UserRole::Admin);

        let logged_in = service
            .authenticate_user(Credentials::new("root@x.com", "pw123456"))
            .await
            .unwrap();
        assert_eq!(logged_in.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_are_indistinguishable() {
        let (service, _) = service();
        service
            .create_user(NewUser::new("Ana", "a@x.com", "pw123456"))
            .await
            .unwrap();

        let wrong_password = service
            .authenticate_user(Credentials::new("a@x.com", "nope"))
            .await
            .unwrap_err();
        let unknown_email = service
            .authenticate_user(Credentials::new("b@x.com", "pw123456"))
            .await
            .unwrap_err();

        assert_eq!(wrong_password.kind(), AuthErrorKind::InvalidCredentials);
        assert_eq!(unknown_email.kind(), AuthErrorKind::InvalidCredentials);
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.to_string(), "Invalid email or password");
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let (service, _) = service();
        service
            .create_user(NewUser::new("Ana", "a@x.com", "pw123456"))
            .await
            .unwrap();

        let err = service
            .authenticate_user(Credentials::new("A@X.COM", "pw123456"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), AuthErrorKind::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_logs_never_contain_secrets() {
        let (service, sink) = service();
        let created = service
            .create_user(NewUser::new("Ana", "a@x.com", "pw123456"))
            .await
            .unwrap();
        let _ = service
            .authenticate_user(Credentials::new("a@x.com", "pw123456"))
            .await;
        let _ = service
            .authenticate_user(Credentials::new("a@x.com", "hunter2"))
            .await;

        let digest = service
            .store()
            .find_by_id(created.id)
            .await
            .unwrap()
            .unwrap()
            .password_digest;

        let records = sink.records();
        assert!(sink.contains_event("user_created"));
        assert!(sink.contains_event("user_authenticated"));
        assert!(sink.contains_event("user_authenticate_failed"));
        assert!(records
            .iter()
            .filter(|r| r.event.ends_with("_failed"))
            .all(|r| r.severity == Severity::Error));
        for record in &records {
            assert!(!record.mentions("pw123456"), "{record:?}");
            assert!(!record.mentions("hunter2"), "{record:?}");
            assert!(!record.mentions(&digest), "{record:?}");
        }
    }

    /// Loses every race: the lookup never sees the row, the insert always
    /// hits the constraint.
    struct RacingStore;

    #[async_trait]
    impl UserStore for RacingStore {
        async fn migrate(&self) -> StoreResult<()> {
            Ok(())
        }

        async fn find_by_email(&self, _email: &str) -> StoreResult<Option<User>> {
            Ok(None)
        }

        async fn find_by_id(&self, _id: Uuid) -> StoreResult<Option<User>> {
            Ok(None)
        }

        async fn insert(&self, _user: &User) -> StoreResult<User> {
            Err(StoreError::UniqueViolation("users.email".to_string()))
        }
    }

    #[tokio::test]
    async fn test_constraint_violation_after_lookup_is_duplicate() {
        let (service, _) = service_with(Arc::new(RacingStore));
        let err = service
            .create_user(NewUser::new("Ana", "a@x.com", "pw123456"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), AuthErrorKind::DuplicateUser);
        assert!(err.cause().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_registrations_admit_one() {
        let (service, _) = service();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .create_user(NewUser::new(format!("N{i}"), "same@x.com", "pw123456"))
                        .await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert_eq!(err.kind(), AuthErrorKind::DuplicateUser),
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_corrupt_digest_is_server_error() {
        let store = Arc::new(InMemoryUserStore::new());
        store
            .insert(&User::new(
                "Ana".into(),
                "a@x.com".into(),
                "not-a-digest".into(),
                UserRole::User,
            ))
            .await
            .unwrap();

        let (service, sink) = service_with(store);
        let err = service
            .authenticate_user(Credentials::new("a@x.com", "pw123456"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), AuthErrorKind::PasswordVerification);
        assert_eq!(err.to_string(), "Error comparing passwords");

        let failure = sink
            .records()
            .into_iter()
            .find(|r| r.event == "user_authenticate_failed")
            .unwrap();
        assert_eq!(failure.severity, Severity::Error);
    }
}
