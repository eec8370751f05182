//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MERCATA_SESSION_SECRET` - Token signing secret (min 32 chars, high entropy)
//! - `MERCATA_DATABASE_URL` - `PostgreSQL` connection string (postgres backend only)
//!
//! ## Optional
//! - `MERCATA_HOST` - Bind address (default: 127.0.0.1)
//! - `MERCATA_PORT` - Listen port (default: 8000)
//! - `MERCATA_STORE` - Store backend, `postgres` or `memory` (default: postgres)
//! - `MERCATA_BASE_URL` - Public base URL (default: http://localhost:8000);
//!   an https scheme marks the session cookie `Secure`
//! - `MERCATA_SESSION_TTL_SECS` - Session token lifetime (default: 7 days)

use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Which store backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// `PostgreSQL` via sqlx (production).
    #[default]
    Postgres,
    /// In-process memory store (tests, local development).
    Memory,
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the API
    pub base_url: String,
    /// Store backend selection
    pub store_backend: StoreBackend,
    /// `PostgreSQL` connection URL (contains password); absent for the
    /// memory backend
    pub database_url: Option<SecretString>,
    /// Session token signing secret
    pub session_secret: SecretString,
    /// Session token lifetime in seconds
    pub session_ttl_secs: i64,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required variable is missing, a value
    /// fails to parse, or the session secret looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host: IpAddr = optional_var("MERCATA_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_owned())
            .parse()
            .map_err(|e| invalid("MERCATA_HOST", &e))?;

        let port: u16 = optional_var("MERCATA_PORT")
            .unwrap_or_else(|| "8000".to_owned())
            .parse()
            .map_err(|e| invalid("MERCATA_PORT", &e))?;

        let base_url = optional_var("MERCATA_BASE_URL")
            .unwrap_or_else(|| "http://localhost:8000".to_owned());

        let store_backend = match optional_var("MERCATA_STORE").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidEnvVar(
                    "MERCATA_STORE".to_owned(),
                    format!("expected 'postgres' or 'memory', got {other:?}"),
                ));
            }
        };

        let database_url = optional_var("MERCATA_DATABASE_URL").map(SecretString::from);
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingEnvVar("MERCATA_DATABASE_URL".to_owned()));
        }

        let session_secret = SecretString::from(required_var("MERCATA_SESSION_SECRET")?);
        validate_session_secret("MERCATA_SESSION_SECRET", &session_secret)?;

        let session_ttl_secs: i64 = optional_var("MERCATA_SESSION_TTL_SECS")
            .unwrap_or_else(|| (7 * 24 * 60 * 60).to_string())
            .parse()
            .map_err(|e| invalid("MERCATA_SESSION_TTL_SECS", &e))?;

        Ok(Self {
            host,
            port,
            base_url,
            store_backend,
            database_url,
            session_secret,
            session_ttl_secs,
        })
    }

    /// The socket address to bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the public base URL is served over HTTPS.
    ///
    /// Controls the `Secure` attribute on the session cookie.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

fn required_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_owned()))
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn invalid(name: &str, err: &dyn std::fmt::Display) -> ConfigError {
    ConfigError::InvalidEnvVar(name.to_owned(), err.to_string())
}

/// Reject secrets that are too short or look like placeholders.
fn validate_session_secret(name: &str, secret: &SecretString) -> Result<(), ConfigError> {
    let value = secret.expose_secret();

    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            name.to_owned(),
            format!("must be at least {MIN_SESSION_SECRET_LENGTH} characters"),
        ));
    }

    let lowered = value.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lowered.contains(**p)) {
        return Err(ConfigError::InsecureSecret(
            name.to_owned(),
            format!("contains placeholder pattern {pattern:?}"),
        ));
    }

    Ok(())
}
