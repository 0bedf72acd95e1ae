//! # Warden Auth Module
//!
//! User registration, credential login and stateless session tokens.
//!
//! Every component takes its configuration and an `Arc<dyn LogSink>` at
//! construction; nothing reads the environment or a global logger.

pub mod crypto;
pub mod errors;
pub mod jwt;
pub mod service;
pub mod store;
pub mod user;

pub use crypto::{CredentialHasher, HasherConfig};
pub use errors::{AuthError, AuthErrorKind, AuthResult, TokenRejection};
pub use jwt::{Claims, SessionClaims, TokenConfig, TokenIssuer};
pub use service::AuthService;
pub use store::{connect_store, DatabaseConfig, InMemoryUserStore, StoreError, UserStore};
pub use user::{AuthenticatedUser, Credentials, NewUser, RegisteredUser, User, UserRole};
