//! Command-line and environment configuration.
//!
//! Every connection flag can also come from the environment (`MM_URL`,
//! `MM_TOKEN`, `MM_USERNAME`, `MM_PASSWORD`); explicit flags win. The binary
//! loads a `.env` file before parsing, so those variables may live there too.

use crate::audit::AuditOptions;
use crate::client::ServerConfig;
use crate::error::{AuditError, Result};
use crate::output::OutputFormat;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

pub const PASSWORD_ENV: &str = "MM_PASSWORD";

/// Audit the plugins installed on a Mattermost server against the Marketplace
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "mm-plugin-audit", version, about, long_about = None)]
pub struct Cli {
    /// Mattermost server URL
    #[arg(long, env = "MM_URL")]
    pub url: Option<String>,

    /// Personal Access Token
    #[arg(long, env = "MM_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Username for password auth (password from a prompt or MM_PASSWORD)
    #[arg(long, env = "MM_USERNAME")]
    pub username: Option<String>,

    /// Output format: table, csv, json
    #[arg(long, default_value = "table")]
    pub format: String,

    /// Write output to file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Show only plugins with available updates (plus non-Marketplace plugins)
    #[arg(long)]
    pub outdated_only: bool,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Where a password comes from when logging in with a username.
pub trait PasswordSource {
    /// True when a user can be prompted.
    fn is_interactive(&self) -> bool;

    /// Asks for the password without echoing it.
    fn prompt(&self) -> std::io::Result<String>;

    /// Password supplied through the environment, if any.
    fn from_env(&self) -> Option<String>;
}

/// Prompts on the controlling terminal, falls back to `MM_PASSWORD`.
pub struct TerminalPassword;

impl PasswordSource for TerminalPassword {
    fn is_interactive(&self) -> bool {
        std::io::stdin().is_terminal()
    }

    fn prompt(&self) -> std::io::Result<String> {
        rpassword::prompt_password("Password: ")
    }

    fn from_env(&self) -> Option<String> {
        std::env::var(PASSWORD_ENV).ok()
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub options: AuditOptions,
    pub verbose: bool,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl Settings {
    /// Validates the parsed flags and resolves credentials.
    pub fn from_cli(cli: Cli, passwords: &dyn PasswordSource) -> Result<Self> {
        let url = non_empty(cli.url)
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                AuditError::config(
                    "error: server URL is required. Use --url or set the MM_URL environment variable.",
                )
            })?;

        let format: OutputFormat = cli.format.parse().map_err(AuditError::config)?;

        let token = non_empty(cli.token);
        let username = non_empty(cli.username);

        let password = match (&token, &username) {
            (None, None) => {
                return Err(AuditError::config(
                    "error: authentication required. Use --token (or MM_TOKEN) for token auth, or --username (or MM_USERNAME) for password auth.",
                ))
            }
            (None, Some(_)) => Some(resolve_password(passwords)?),
            (Some(_), _) => None,
        };

        Ok(Settings {
            server: ServerConfig {
                url,
                token,
                username,
                password,
            },
            format,
            output: cli.output,
            options: AuditOptions {
                outdated_only: cli.outdated_only,
            },
            verbose: cli.verbose,
        })
    }
}

fn resolve_password(passwords: &dyn PasswordSource) -> Result<String> {
    if passwords.is_interactive() {
        return passwords.prompt().map_err(|e| {
            AuditError::config(format!("error: failed to read password: {}", e))
                .with_source(Box::new(e))
        });
    }

    non_empty(passwords.from_env()).ok_or_else(|| {
        AuditError::config(
            "error: password required. Set MM_PASSWORD environment variable for non-interactive use.",
        )
    })
}
