//! Command-line and environment configuration.

use clap::Parser;

use crate::session::TokenSource;

/// Terminal client for a per-user todo list stored behind a SQL query endpoint.
#[derive(Debug, Clone, Parser)]
#[command(name = "todo-console", version)]
pub struct Config {
    /// Base URL of the query service; requests go to `{base_url}/query`.
    #[arg(long, env = "STARBASEDB_URL")]
    pub base_url: String,

    /// Fixed bearer token.
    #[arg(long, env = "STARBASEDB_TOKEN", hide_env_values = true, conflicts_with = "token_command")]
    pub token: Option<String>,

    /// Shell command printing a fresh token on stdout, run on every sign-in.
    #[arg(long, env = "STARBASEDB_TOKEN_COMMAND")]
    pub token_command: Option<String>,

    /// User id shown in the header.
    #[arg(long, env = "TODO_USER_ID", default_value = "local-user")]
    pub user_id: String,

    /// Email shown in the header.
    #[arg(long, env = "TODO_USER_EMAIL", default_value = "")]
    pub email: String,
}

impl Config {
    /// Where tokens come from, or `None` when neither option was given.
    pub fn token_source(&self) -> Option<TokenSource> {
        if let Some(command) = &self.token_command {
            return Some(TokenSource::Command(command.clone()));
        }
        self.token.clone().map(TokenSource::Static)
    }
}
