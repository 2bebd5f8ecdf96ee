//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to deserialize environment variables into a
//! type-safe struct.

use std::{fmt, str::FromStr};

use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `SERVER_PORT` (optional): HTTP listen port, defaults to 8080
/// - `DB_HOST` (optional): defaults to `localhost`
/// - `DB_PORT` (optional): defaults to 5432
/// - `DB_USER` (required)
/// - `DB_PASSWORD` (optional): defaults to empty
/// - `DB_NAME` (required)
/// - `DB_SSLMODE` (optional): libpq ssl mode, defaults to `disable`
/// - `DB_MAX_CONNECTIONS` (optional): pool size, defaults to 5
/// - `LOG_FORMAT` (optional): `pretty` or `json`, defaults to `pretty`
#[derive(Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_server_port")]
    pub server_port: u16,

    #[serde(default = "default_db_host")]
    pub db_host: String,

    #[serde(default = "default_db_port")]
    pub db_port: u16,

    pub db_user: String,

    #[serde(default)]
    pub db_password: String,

    pub db_name: String,

    #[serde(default = "default_db_sslmode")]
    pub db_sslmode: String,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    #[serde(default)]
    pub log_format: LogFormat,
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_server_port() -> u16 {
    8080
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_sslmode() -> String {
    "disable".to_string()
}

fn default_db_max_connections() -> u32 {
    5
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Loads an optional `.env` file first, then reads the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DB_USER)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Does nothing if there is no .env file
        dotenvy::dotenv().ok();

        // db_host -> DB_HOST
        envy::from_env::<Config>()
    }

    /// Connection options for the ledger database.
    ///
    /// # Errors
    ///
    /// Returns an error if `DB_SSLMODE` is not a known ssl mode.
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        let ssl_mode = PgSslMode::from_str(&self.db_sslmode)?;

        Ok(PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .username(&self.db_user)
            .password(&self.db_password)
            .database(&self.db_name)
            .ssl_mode(ssl_mode))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_port", &self.server_port)
            .field("db_host", &self.db_host)
            .field("db_port", &self.db_port)
            .field("db_user", &self.db_user)
            .field("db_password", &"<redacted>")
            .field("db_name", &self.db_name)
            .field("db_sslmode", &self.db_sslmode)
            .field("db_max_connections", &self.db_max_connections)
            .field("log_format", &self.log_format)
            .finish()
    }
}
