//! Loading and validating environment profiles from TOML

use std::path::Path;
use thiserror::Error;

use crate::environment::EnvironmentConfig;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found
    #[error("config file not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error
    #[error("validation error: {0}")]
    Validation(String),
}

impl EnvironmentConfig {
    /// Load an environment profile from a TOML file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;

        tracing::info!(
            environment = %config.name,
            path = %path.display(),
            "Loaded environment profile"
        );
        Ok(config)
    }

    /// Parse an environment profile from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EnvironmentConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_id.trim().is_empty() {
            return Err(ConfigError::Validation("app_id cannot be empty".to_string()));
        }

        if self.network_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "network_id cannot be empty".to_string(),
            ));
        }

        if self.operator_fee.is_sign_negative() || self.operator_fee.is_zero() {
            return Err(ConfigError::Validation(format!(
                "operator_fee must be positive, got {}",
                self.operator_fee
            )));
        }

        if self.operator_fee.normalize().scale() > self.precision {
            return Err(ConfigError::Validation(format!(
                "operator_fee {} exceeds precision of {} decimal places",
                self.operator_fee, self.precision
            )));
        }

        if let Some(url) = &self.funding_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Validation(format!(
                    "funding_url must be an http(s) URL, got '{url}'"
                )));
            }
        }

        if self.confirmation.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "confirmation.poll_interval_ms must be > 0".to_string(),
            ));
        }

        if self.confirmation.max_wait_ms < self.confirmation.poll_interval_ms {
            return Err(ConfigError::Validation(format!(
                "confirmation.max_wait_ms ({}) is shorter than poll_interval_ms ({})",
                self.confirmation.max_wait_ms, self.confirmation.poll_interval_ms
            )));
        }

        Ok(())
    }
}
