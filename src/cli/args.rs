//! CLI argument definitions using clap
//!
//! Commands:
//! - warden migrate
//! - warden register --name <NAME> --email <EMAIL> --password <PASSWORD> [--role <ROLE>]
//! - warden login --email <EMAIL> --password <PASSWORD>
//! - warden verify-token <TOKEN>
//!
//! Everything else (secret, ttl, database) comes from the environment.

use clap::{Parser, Subcommand};

use crate::auth::UserRole;

/// Warden - user registration, login and session tokens
#[derive(Parser, Debug)]
#[command(name = "warden")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create the users table if it does not exist
    Migrate,

    /// Register a new user and print it with a session token
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// `user` or `admin`
        #[arg(long, default_value = "user")]
        role: UserRole,
    },

    /// Check credentials and print the user with a session token
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Verify a session token and print its claims
    VerifyToken {
        /// Compact JWT as returned by register or login
        token: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
