//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

use uuid::Uuid;

use crate::store::RetryPolicy;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Secret used to sign session tokens
    pub jwt_secret: String,

    /// Session token lifetime in seconds
    pub session_max_age_secs: i64,

    /// Fixed counterparty account for deposits and withdrawals
    pub system_account_id: Uuid,

    /// Retry budget for transactional units of work
    pub tx_max_retries: u32,

    /// Initial backoff delay between transaction retries
    pub tx_initial_delay: Duration,

    /// Backoff delay cap
    pub tx_max_delay: Duration,

    /// Email substrings rejected by the registration risk screen.
    /// Empty list disables the screen.
    pub risk_deny_patterns: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string());

        let session_max_age_secs = env::var("SESSION_MAX_AGE_SECS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SESSION_MAX_AGE_SECS"))?;

        let system_account_id = env::var("SYSTEM_ACCOUNT_ID")
            .unwrap_or_else(|_| "d91481ed-168f-4c31-826b-7db21f98bab6".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SYSTEM_ACCOUNT_ID"))?;

        let tx_max_retries = env::var("TX_MAX_RETRIES")
            .unwrap_or_else(|_| "0".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TX_MAX_RETRIES"))?;

        let tx_initial_delay_ms: u64 = env::var("TX_INITIAL_DELAY_MS")
            .unwrap_or_else(|_| "50".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TX_INITIAL_DELAY_MS"))?;

        let tx_max_delay_ms: u64 = env::var("TX_MAX_DELAY_MS")
            .unwrap_or_else(|_| "10000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TX_MAX_DELAY_MS"))?;

        let risk_deny_patterns = env::var("RISK_DENY_PATTERNS")
            .map(|raw| {
                raw.split(',')
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            jwt_secret,
            session_max_age_secs,
            system_account_id,
            tx_max_retries,
            tx_initial_delay: Duration::from_millis(tx_initial_delay_ms),
            tx_max_delay: Duration::from_millis(tx_max_delay_ms),
            risk_deny_patterns,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Retry policy for balance-mutating units of work
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.tx_max_retries,
            initial_delay: self.tx_initial_delay,
            max_delay: self.tx_max_delay,
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
