//! CLI module for Warden
//!
//! Provides command-line interface for:
//! - migrate: Create the users table
//! - register: Create a user and issue a token
//! - login: Check credentials and issue a token
//! - verify-token: Print the claims of a valid token

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{bootstrap, login, migrate, register, run_command, verify_token, Context};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_response, write_response_to};

use crate::config::AppConfig;
use crate::observability::{init_tracing, TracingSink};

/// Parse arguments, boot, run one command and print its result
pub async fn run() -> CliResult<()> {
    let cli = Cli::parse_args();

    init_tracing();
    let config = AppConfig::from_env()?;
    let ctx = bootstrap(&config, TracingSink::shared()).await?;

    let output = run_command(&ctx, cli.command).await?;
    write_response(output)
}
