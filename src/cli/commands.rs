//! CLI command implementations
//!
//! Boot sequence:
//! 1. Configuration is loaded once, by the caller
//! 2. The store is opened from `DATABASE_URL`
//! 3. Hasher, service and token issuer are wired with the shared log sink
//! 4. Exactly one command runs and returns a JSON value

use std::sync::Arc;

use serde_json::{json, Value};

use crate::auth::{
    connect_store, AuthService, CredentialHasher, Credentials, NewUser, SessionClaims,
    TokenIssuer, UserStore,
};
use crate::config::AppConfig;
use crate::observability::LogSink;

use super::args::Command;
use super::errors::CliResult;

/// Wired components for one CLI invocation
pub struct Context {
    pub store: Arc<dyn UserStore>,
    pub service: AuthService,
    pub issuer: TokenIssuer,
    pub log: Arc<dyn LogSink>,
}

/// Open the store and wire every component from `config`
pub async fn bootstrap(config: &AppConfig, log: Arc<dyn LogSink>) -> CliResult<Context> {
    if config.token.uses_placeholder_secret() {
        log.warn(
            "placeholder_jwt_secret",
            &[("hint", "set JWT_SECRET; tokens signed with the default are forgeable")],
        );
    }

    let store = connect_store(&config.database).await.map_err(|e| {
        log.error(
            "store_connect_failed",
            &[("scheme", config.database.scheme()), ("error", &e.to_string())],
        );
        e
    })?;

    let hasher = CredentialHasher::new(&config.hasher, log.clone())?;
    let service = AuthService::new(store.clone(), hasher, log.clone());
    let issuer = TokenIssuer::new(&config.token, log.clone());

    log.info(
        "boot_complete",
        &[
            ("store", config.database.scheme()),
            ("token_ttl_secs", &config.token.ttl.num_seconds().to_string()),
        ],
    );

    Ok(Context {
        store,
        service,
        issuer,
        log,
    })
}

/// Dispatch a parsed command
pub async fn run_command(ctx: &Context, command: Command) -> CliResult<Value> {
    match command {
        Command::Migrate => migrate(ctx).await,
        Command::Register {
            name,
            email,
            password,
            role,
        } => register(ctx, NewUser::new(name, email, password).with_role(role)).await,
        Command::Login { email, password } => login(ctx, Credentials::new(email, password)).await,
        Command::VerifyToken { token } => verify_token(ctx, &token),
    }
}

/// Create the users table if it does not exist
pub async fn migrate(ctx: &Context) -> CliResult<Value> {
    ctx.store.migrate().await?;
    ctx.log.info("store_migrated", &[]);
    Ok(json!({ "migrated": true }))
}

/// Register a user and issue a session token for it
pub async fn register(ctx: &Context, input: NewUser) -> CliResult<Value> {
    let user = ctx.service.create_user(input).await?;
    let token = ctx.issuer.issue(&SessionClaims::from(&user))?;
    Ok(json!({ "user": user, "token": token }))
}

/// Authenticate and issue a session token
pub async fn login(ctx: &Context, credentials: Credentials) -> CliResult<Value> {
    let user = ctx.service.authenticate_user(credentials).await?;
    let token = ctx.issuer.issue(&SessionClaims::from(&user))?;
    Ok(json!({ "user": user, "token": token }))
}

/// Print every claim of a valid token
pub fn verify_token(ctx: &Context, token: &str) -> CliResult<Value> {
    let claims = ctx.issuer.verify(token)?;
    Ok(Value::Object(claims))
}
