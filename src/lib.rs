//! warden - user registration, credential login and stateless session tokens
//!
//! - [`auth`]: credential hasher, user store gateway, session token issuer
//! - [`config`]: environment configuration handed to each component
//! - [`observability`]: injected log sinks over `tracing`
//! - [`cli`]: the `warden` command-line bootstrap

pub mod auth;
pub mod cli;
pub mod config;
pub mod observability;
