//! Service configuration
//!
//! Values come from, in increasing priority:
//! 1. built-in defaults
//! 2. a TOML file (`--config`)
//! 3. `PLONK_VERIFIER_*` environment variables
//! 4. CLI flags
//!
//! # Environment Variables
//! - `PLONK_VERIFIER_BIND` - listen address (default: "127.0.0.1:8080")
//! - `PLONK_VERIFIER_KEY_FILE` - verification key file (TOML or raw `.bin`)
//! - `PLONK_VERIFIER_LOG_LEVEL` - trace, debug, info, warn, error
//! - `PLONK_VERIFIER_LOG_JSON` - "1"/"true" for JSON log lines
//! - `PLONK_VERIFIER_MAX_BATCH_SIZE` - proofs accepted per batch request
//! - `PLONK_VERIFIER_CORS_ORIGINS` - comma-separated allowed origins

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("no verification key file configured")]
    MissingKeyFile,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address
    pub bind: String,
    /// Verification key file
    pub key_file: Option<PathBuf>,
    pub log_level: String,
    /// Emit JSON log lines instead of pretty output
    pub log_json: bool,
    /// Upper bound on proofs per `/verify/batch` request
    pub max_batch_size: usize,
    /// Allowed CORS origins; empty disables CORS headers
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            key_file: None,
            log_level: "info".to_string(),
            log_json: false,
            max_batch_size: 64,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents)
    }

    /// Defaults, then the optional file, then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Override fields from `PLONK_VERIFIER_*` variables looked up via `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PLONK_VERIFIER_BIND") {
            self.bind = v;
        }
        if let Some(v) = lookup("PLONK_VERIFIER_KEY_FILE") {
            self.key_file = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("PLONK_VERIFIER_LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = lookup("PLONK_VERIFIER_LOG_JSON") {
            self.log_json = parse_bool("PLONK_VERIFIER_LOG_JSON", &v)?;
        }
        if let Some(v) = lookup("PLONK_VERIFIER_MAX_BATCH_SIZE") {
            self.max_batch_size = v.parse().map_err(|_| {
                ConfigError::InvalidValue(
                    "PLONK_VERIFIER_MAX_BATCH_SIZE".to_string(),
                    "must be a number".to_string(),
                )
            })?;
        }
        if let Some(v) = lookup("PLONK_VERIFIER_CORS_ORIGINS") {
            self.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.max_batch_size == 0 {
            return Err(ConfigError::InvalidValue(
                "max_batch_size".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        if self.key_file.is_none() {
            return Err(ConfigError::MissingKeyFile);
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .parse()
            .map_err(|e| ConfigError::InvalidValue("bind".to_string(), format!("{}", e)))
    }

    pub fn key_file(&self) -> Result<&Path, ConfigError> {
        self.key_file.as_deref().ok_or(ConfigError::MissingKeyFile)
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue(
            name.to_string(),
            format!("expected a boolean, got {}", value),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.max_batch_size, 64);
        assert!(!config.log_json);
        assert!(config.bind_addr().is_ok());
        assert!(matches!(config.validate(), Err(ConfigError::MissingKeyFile)));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ServerConfig::from_toml_str(
            r#"
            key_file = "keys/rollup.toml"
            max_batch_size = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.max_batch_size, 8);
        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.key_file, Some(PathBuf::from("keys/rollup.toml")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_io_error_names_path_and_cause() {
        let path = Path::new("/nonexistent/plonk/verifier.toml");
        let err = ServerConfig::from_file(path).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
        let message = err.to_string();
        assert!(message.starts_with("failed to read /nonexistent/plonk/verifier.toml: "));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(matches!(
            ServerConfig::from_toml_str("max_batch = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("PLONK_VERIFIER_BIND", "0.0.0.0:9100"),
            ("PLONK_VERIFIER_LOG_JSON", "true"),
            ("PLONK_VERIFIER_MAX_BATCH_SIZE", "16"),
            ("PLONK_VERIFIER_CORS_ORIGINS", "http://localhost:3000, https://a.example"),
        ]
        .into_iter()
        .collect();

        let mut config = ServerConfig::default();
        config
            .apply_env(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.bind, "0.0.0.0:9100");
        assert!(config.log_json);
        assert_eq!(config.max_batch_size, 16);
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.cors_origins[1], "https://a.example");
    }

    #[test]
    fn test_env_bad_values() {
        let mut config = ServerConfig::default();
        let err = config
            .apply_env(|name| (name == "PLONK_VERIFIER_MAX_BATCH_SIZE").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("PLONK_VERIFIER_MAX_BATCH_SIZE"));

        let err = config
            .apply_env(|name| (name == "PLONK_VERIFIER_LOG_JSON").then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(..)));
    }

    #[test]
    fn test_validate_rejects_zero_batch_and_bad_bind() {
        let mut config = ServerConfig {
            key_file: Some(PathBuf::from("vk.toml")),
            ..Default::default()
        };
        config.max_batch_size = 0;
        assert!(config.validate().is_err());

        config.max_batch_size = 1;
        config.bind = "not an address".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(..))));
    }
}
