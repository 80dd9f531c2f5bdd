//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::path::PathBuf;
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
    pub snapshot_path: PathBuf,
    pub cors_origin: HeaderValue,
    pub log_level: Level,
    pub max_body_bytes: usize,
}

const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address_str = var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:5001".to_string());
        let mut bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        if let Some(port) = var("PORT") {
            let port = port
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), e.to_string()))?;
            bind_address.set_port(port);
        }

        let origin_str =
            var("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:5173".to_string());
        let cors_origin = HeaderValue::from_str(&origin_str).map_err(|e| {
            ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string())
        })?;

        let max_body_bytes = match var("MAX_BODY_BYTES") {
            Some(raw) => raw.parse::<usize>().map_err(|e| {
                ConfigError::InvalidValue("MAX_BODY_BYTES".to_string(), e.to_string())
            })?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        // --- Storage ---
        let snapshot_path = var("SNAPSHOT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./sessions.json"));
        if snapshot_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingVar("SNAPSHOT_PATH".to_string()));
        }

        // --- Logging ---
        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            snapshot_path,
            cors_origin,
            log_level,
            max_body_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_match_the_recorder_frontend() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:5001".parse::<SocketAddr>().unwrap());
        assert_eq!(config.snapshot_path, PathBuf::from("./sessions.json"));
        assert_eq!(config.cors_origin, "http://localhost:5173");
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn port_overrides_bind_address_port() {
        let config = load(&[("BIND_ADDRESS", "127.0.0.1:3000"), ("PORT", "8080")]).unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "PORT"));

        let err = load(&[("RUST_LOG", "chatty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "RUST_LOG"));

        let err = load(&[("CORS_ORIGIN", "http://bad\norigin")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "CORS_ORIGIN"));
    }

    #[test]
    fn empty_snapshot_path_is_rejected() {
        let err = load(&[("SNAPSHOT_PATH", "")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref var) if var == "SNAPSHOT_PATH"));
    }
}
