//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub youtube_api_key: String,
    pub youtube_api_base_url: String,
    /// Upper bound on a single comment fetch.
    pub fetch_timeout: Duration,
    /// Cosmetic pause before each fetch is issued.
    pub fetch_delay: Duration,
    pub allowed_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Load Server Settings ---
        let bind_address_str =
            lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let allowed_origin =
            lookup("ALLOWED_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        // --- Load Comment Source Settings ---
        let youtube_api_key = lookup("YOUTUBE_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("YOUTUBE_API_KEY".to_string()))?;

        let youtube_api_base_url = lookup("YOUTUBE_API_BASE_URL")
            .unwrap_or_else(|| "https://www.googleapis.com/youtube/v3".to_string());

        let fetch_timeout_secs = parse_u64(&lookup, "FETCH_TIMEOUT_SECS", 10)?;
        if fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "FETCH_TIMEOUT_SECS".to_string(),
                "the timeout must be at least one second".to_string(),
            ));
        }
        let fetch_delay_ms = parse_u64(&lookup, "FETCH_DELAY_MS", 0)?;

        Ok(Self {
            bind_address,
            log_level,
            youtube_api_key,
            youtube_api_base_url,
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            fetch_delay: Duration::from_millis(fetch_delay_ms),
            allowed_origin,
        })
    }
}

fn parse_u64<F>(lookup: &F, key: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_the_key_is_set() {
        let config = load(&[("YOUTUBE_API_KEY", "secret")]).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.youtube_api_base_url, "https://www.googleapis.com/youtube/v3");
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.fetch_delay, Duration::ZERO);
        assert_eq!(config.allowed_origin, "http://localhost:3000");
    }

    #[test]
    fn api_key_is_required() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingVar(var)) if var == "YOUTUBE_API_KEY"));
        assert!(matches!(
            load(&[("YOUTUBE_API_KEY", "  ")]),
            Err(ConfigError::MissingVar(_))
        ));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("YOUTUBE_API_KEY", "secret"),
            ("BIND_ADDRESS", "127.0.0.1:8080"),
            ("RUST_LOG", "debug"),
            ("FETCH_TIMEOUT_SECS", "3"),
            ("FETCH_DELAY_MS", "2000"),
        ])
        .unwrap();
        assert_eq!(config.bind_address.port(), 8080);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.fetch_timeout, Duration::from_secs(3));
        assert_eq!(config.fetch_delay, Duration::from_secs(2));
    }

    #[test]
    fn invalid_values_are_reported_by_name() {
        let err = load(&[("YOUTUBE_API_KEY", "k"), ("FETCH_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "FETCH_TIMEOUT_SECS"));

        let err = load(&[("YOUTUBE_API_KEY", "k"), ("FETCH_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "FETCH_TIMEOUT_SECS"));

        let err = load(&[("YOUTUBE_API_KEY", "k"), ("RUST_LOG", "loud")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "RUST_LOG"));
    }
}
