//! Configuration loader for the daily WeatherLink loader.
//!
//! This module centralizes all runtime configuration values and their
//! defaults, loading from environment variables (with optional `.env` file
//! support provided by the caller). By consolidating configuration logic
//! here, we avoid scattering `env::var` calls throughout the codebase, and
//! the rest of the program receives one immutable snapshot instead of
//! reading ambient global state.

use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent
/// configuration snapshot for the lifetime of the run.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// WeatherLink v2 API key.
    pub api_key: String,

    /// WeatherLink v2 API secret.
    pub api_secret: String,

    /// PostgreSQL connection string (includes the database name).
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// Country-specific prefix of local station external ids.
    pub country_prefix: String,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `WEATHERLINK_API_KEY` – WeatherLink v2 API key
/// - `WEATHERLINK_API_SECRET` – WeatherLink v2 API secret
/// - `DATABASE_URL` – PostgreSQL connection string
/// - `COUNTRY_PREFIX` – external-id prefix selecting this country's stations
///
/// Optional:
/// - `DB_POOL_MAX` – max DB connections (default: 5)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let api_key = require_env!("WEATHERLINK_API_KEY");
    let api_secret = require_env!("WEATHERLINK_API_SECRET");
    let db_url = require_env!("DATABASE_URL");
    let country_prefix = require_env!("COUNTRY_PREFIX");
    let db_pool_max = parse_env_u32!("DB_POOL_MAX", 5);

    Ok(Config {
        api_key,
        api_secret,
        db_url,
        db_pool_max,
        country_prefix,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks sensitive information (API credentials, database password)
    /// while showing all configuration values that were loaded.
    pub fn log_config(&self) {
        // ---
        // Mask the password in the database URL for security
        let masked_db_url = if let Some(at_pos) = self.db_url.rfind('@') {
            if let Some(colon_pos) = self.db_url[..at_pos].rfind(':') {
                format!(
                    "{}:****{}",
                    &self.db_url[..colon_pos],
                    &self.db_url[at_pos..]
                )
            } else {
                self.db_url.clone()
            }
        } else {
            self.db_url.clone()
        };

        tracing::info!("Configuration loaded:");
        tracing::info!("  WEATHERLINK_API_KEY    : {}", mask(&self.api_key));
        tracing::info!("  WEATHERLINK_API_SECRET : {}", mask(&self.api_secret));
        tracing::info!("  DATABASE_URL           : {}", masked_db_url);
        tracing::info!("  DB_POOL_MAX            : {}", self.db_pool_max);
        tracing::info!("  COUNTRY_PREFIX         : {}", self.country_prefix);
    }
}

/// Keep the first four characters of a credential, mask the rest.
fn mask(secret: &str) -> String {
    // ---
    if secret.len() > 4 {
        format!("{}****", &secret[..4])
    } else {
        "****".to_string()
    }
}
