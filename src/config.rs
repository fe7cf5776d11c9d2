use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password, Select};
use reqwest::Url;
use std::path::PathBuf;

use crate::cafe::DEPARTMENTS;

pub const DEFAULT_API_URL: &str = "https://cafe-api-f9re.onrender.com";

/// Cafe Gate - café access desk and student registration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Base URL of the café API
    #[arg(short = 'u', long, env = "CAFE_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Path to the session SQLite database
    #[arg(short = 'd', long, env = "CAFE_SESSION_DB")]
    pub session_db: Option<String>,

    /// Session storage (sqlite, memory, none)
    #[arg(long, env = "CAFE_SESSION_MODE", default_value = "sqlite")]
    pub session_mode: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT", default_value = "30")]
    pub http_timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Log in and store the session
    Login {
        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        password: Option<String>,
    },

    /// Log out and clear the stored session
    Logout,

    /// Show session and meal period status
    Status,

    /// List registered students
    Students,

    /// Show recent meal logs
    Meals {
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Show today's registrations and meals served
    Stats,

    /// Check in a single scanned payload
    Scan { payload: String },

    /// Read scans from stdin, one per line
    Station,

    /// Register a new student and print the ID card
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: String,

        /// Prompted from the department list when omitted
        #[arg(long)]
        department: Option<String>,

        /// Defaults to the current year
        #[arg(long)]
        year: Option<i32>,

        /// Generated when omitted
        #[arg(long)]
        student_id: Option<String>,
    },
}

#[derive(Clone, Debug)]
pub struct Config {
    // API
    pub api_url: String,

    // Session storage
    pub session_mode: SessionMode,
    pub session_db: PathBuf,

    // HTTP client
    pub http_max_connections: usize,
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,

    // Roster
    pub roster_ttl: u64,

    pub log_level: String,

    pub command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SessionMode {
    Sqlite, // Persisted across runs
    Memory, // Lives for one process
    None,   // No storage; requests go out unauthenticated
}

impl Config {
    /// Load configuration from all sources with priority: CLI > ENV > defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_args(CliArgs::parse())
    }

    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Config {
            api_url: args.api_url.trim_end_matches('/').to_string(),

            session_mode: parse_session_mode(&args.session_mode).with_context(|| {
                format!(
                    "Invalid CAFE_SESSION_MODE '{}' (expected sqlite, memory or none)",
                    args.session_mode
                )
            })?,

            session_db: args
                .session_db
                .map(|s| expand_tilde(&s))
                .unwrap_or_else(default_session_db),

            // HTTP client
            http_max_connections: std::env::var("HTTP_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),

            http_connect_timeout: std::env::var("HTTP_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),

            http_request_timeout: args.http_timeout,

            roster_ttl: std::env::var("ROSTER_TTL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),

            log_level: args.log_level,

            command: args.command,
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_url)
            .with_context(|| format!("CAFE_API_URL is not a valid URL: {}", self.api_url))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!("CAFE_API_URL must use http or https: {}", self.api_url);
        }

        if self.http_request_timeout == 0 || self.http_connect_timeout == 0 {
            anyhow::bail!("HTTP timeouts must be greater than zero");
        }

        if self.http_max_connections == 0 {
            anyhow::bail!("HTTP_MAX_CONNECTIONS must be greater than zero");
        }

        Ok(())
    }
}

/// Default session database under the user's data directory
fn default_session_db() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cafe-gate")
        .join("session.sqlite3")
}

/// Expand tilde (~) in file paths to user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse session mode from string
fn parse_session_mode(s: &str) -> Option<SessionMode> {
    match s.trim().to_lowercase().as_str() {
        "sqlite" | "" => Some(SessionMode::Sqlite),
        "memory" => Some(SessionMode::Memory),
        "none" | "off" => Some(SessionMode::None),
        _ => None,
    }
}

// === Interactive Prompts ===

/// Ask for whatever login credentials were not given on the command line
pub fn prompt_credentials(
    username: Option<String>,
    password: Option<String>,
) -> Result<(String, String)> {
    let username = match username {
        Some(username) => username,
        None => Input::new()
            .with_prompt("Username")
            .interact_text()
            .context("Failed to read username")?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .context("Failed to read password")?,
    };

    if username.trim().is_empty() || password.is_empty() {
        anyhow::bail!("Username and password cannot be empty");
    }

    Ok((username.trim().to_string(), password))
}

/// Pick a department from the registration list
pub fn prompt_department() -> Result<String> {
    let idx = Select::new()
        .with_prompt("Department")
        .items(&DEPARTMENTS)
        .default(0)
        .interact()
        .context("Failed to read department selection")?;
    Ok(DEPARTMENTS[idx].to_string())
}
