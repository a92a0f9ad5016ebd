//! Configuration management for the event store gateway.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::{Error, Result};

/// Where database credentials come from.
#[derive(Clone)]
pub enum CredentialSource {
    /// `DB_USER` / `DB_PASSWORD` supplied directly
    Static { username: String, password: String },
    /// AWS Secrets Manager secret holding `{"username", "password"}`
    Secret { arn: String },
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Static { username, .. } => f
                .debug_struct("Static")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            CredentialSource::Secret { arn } => {
                f.debug_struct("Secret").field("arn", arn).finish()
            }
        }
    }
}

/// How to reach the database.
#[derive(Debug, Clone)]
pub enum DatabaseTarget {
    /// Full connection URL from `DATABASE_URL`
    Url(String),
    /// Connection assembled from individual settings
    Parts {
        host: String,
        port: u16,
        name: String,
        credentials: CredentialSource,
        ssl_mode: String,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database location and credentials
    pub database: DatabaseTarget,
    /// Upper bound on pooled connections
    pub max_connections: u32,
    /// How long a request waits for a pooled connection
    pub acquire_timeout: Duration,
    /// How long a single statement may run
    pub statement_timeout: Duration,
    /// Table holding the events
    pub events_table: String,
}

impl Config {
    /// Load configuration from a `.env` file (if present) and the environment.
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(Error::Config(format!("Failed to read .env file: {}", e)));
            }
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = match non_empty(&lookup, "DATABASE_URL") {
            Some(url) => DatabaseTarget::Url(url),
            None => {
                let credentials = match non_empty(&lookup, "DB_SECRET_ARN") {
                    Some(arn) => CredentialSource::Secret { arn },
                    None => CredentialSource::Static {
                        username: required(&lookup, "DB_USER")?,
                        password: required(&lookup, "DB_PASSWORD")?,
                    },
                };

                DatabaseTarget::Parts {
                    host: non_empty(&lookup, "DB_HOST").unwrap_or_else(|| "localhost".to_string()),
                    port: parse_or(&lookup, "DB_PORT", 5432)?,
                    name: required(&lookup, "DB_NAME")?,
                    credentials,
                    ssl_mode: non_empty(&lookup, "DB_SSLMODE").unwrap_or_else(|| "disable".to_string()),
                }
            }
        };

        let max_connections: u32 = parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?;
        if max_connections == 0 {
            return Err(Error::Config("DB_MAX_CONNECTIONS must be at least 1".to_string()));
        }

        let events_table = non_empty(&lookup, "EVENTS_TABLE").unwrap_or_else(|| "events".to_string());
        if !is_identifier(&events_table) {
            return Err(Error::Config(format!("Invalid EVENTS_TABLE name: {}", events_table)));
        }

        Ok(Self {
            database,
            max_connections,
            acquire_timeout: Duration::from_secs(parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 3)?),
            statement_timeout: Duration::from_secs(parse_or(&lookup, "DB_STATEMENT_TIMEOUT_SECS", 5)?),
            events_table,
        })
    }
}

/// True for plain SQL identifiers: a letter or underscore followed by letters, digits or underscores.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key).ok_or_else(|| Error::Config(format!("{} not set", key)))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match non_empty(lookup, key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("Invalid {}: {}", key, raw))),
        None => Ok(default),
    }
}
