//! Application context - resolves the environment the commands run against

use anyhow::Context;
use relaypay_config::{Environment, EnvironmentConfig};
use std::path::Path;
use std::sync::Arc;

/// Application context shared by every command
pub struct AppContext {
    pub env: Arc<EnvironmentConfig>,
}

impl AppContext {
    /// Built-in profile, or a TOML profile file when `profile` is given
    pub fn new(environment: Environment, profile: Option<&Path>) -> Result<Self, anyhow::Error> {
        let env = match profile {
            Some(path) => EnvironmentConfig::load_file(path)
                .with_context(|| format!("failed to load profile {}", path.display()))?,
            None => environment.config()?,
        };

        tracing::debug!(environment = %env.name, network = %env.network_url, "Environment resolved");

        Ok(Self { env: Arc::new(env) })
    }

    pub fn from_config(env: EnvironmentConfig) -> Self {
        Self { env: Arc::new(env) }
    }
}
