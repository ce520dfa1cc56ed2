//! Environment types and built-in profiles

use relaypay_core::{Address, DEFAULT_PRECISION};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum_macros::{Display, EnumString};

use crate::loader::ConfigError;

/// Application identifier registered with the ledger
pub const APP_ID: &str = "rlpy";

const TEST_OPERATOR_ADDRESS: &str =
    "3d4017c3e843895a92b70aa74d1b7ebc9c982ccf2ec4968cc0cd55f12af4660c";
const PRODUCTION_OPERATOR_ADDRESS: &str =
    "fc51cd8e6218a1a38da47ed00230f0580816ed13ba3303ac5deb911548908025";

/// Named deployment profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Public test network with a faucet
    Test,
    /// Main network, accounts are funded externally
    Production,
}

impl Environment {
    /// Built-in configuration for this profile
    pub fn config(&self) -> Result<EnvironmentConfig, ConfigError> {
        let config = match self {
            Environment::Test => EnvironmentConfig {
                name: "test".to_string(),
                network_id: "Relay Testnet ; March 2024".to_string(),
                network_url: "https://horizon-testnet.relaypay.example".to_string(),
                app_id: APP_ID.to_string(),
                funding_url: Some("https://friendbot-testnet.relaypay.example".to_string()),
                operator_address: builtin_address(TEST_OPERATOR_ADDRESS)?,
                operator_fee: default_operator_fee(),
                precision: DEFAULT_PRECISION,
                confirmation: ConfirmationPolicy::default(),
                funding: FundingSettings::default(),
            },
            Environment::Production => EnvironmentConfig {
                name: "production".to_string(),
                network_id: "Relay Mainnet ; March 2024".to_string(),
                network_url: "https://horizon.relaypay.example".to_string(),
                app_id: APP_ID.to_string(),
                funding_url: None,
                operator_address: builtin_address(PRODUCTION_OPERATOR_ADDRESS)?,
                operator_fee: default_operator_fee(),
                precision: DEFAULT_PRECISION,
                confirmation: ConfirmationPolicy {
                    poll_interval_ms: 1_000,
                    max_wait_ms: 60_000,
                },
                funding: FundingSettings::default(),
            },
        };
        Ok(config)
    }
}

fn builtin_address(hex: &str) -> Result<Address, ConfigError> {
    hex.parse().map_err(|e| {
        ConfigError::Validation(format!("built-in operator address {hex} is invalid: {e}"))
    })
}

/// Full configuration of one environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Profile name (for logging)
    pub name: String,

    /// Ledger network identifier (passphrase)
    pub network_id: String,

    /// Ledger network endpoint
    pub network_url: String,

    /// Application identifier, embedded in transaction memos
    pub app_id: String,

    /// Funding (faucet) service URL; `None` when accounts are created externally
    #[serde(default)]
    pub funding_url: Option<String>,

    /// Operator wallet receiving the linked payment of every transfer
    pub operator_address: Address,

    /// Fixed amount routed to the operator wallet per transfer
    #[serde(default = "default_operator_fee")]
    pub operator_fee: Decimal,

    /// Decimal places of the ledger's minimum unit
    #[serde(default = "default_precision")]
    pub precision: u32,

    #[serde(default)]
    pub confirmation: ConfirmationPolicy,

    #[serde(default)]
    pub funding: FundingSettings,
}

impl EnvironmentConfig {
    /// Whether this environment can create accounts through a faucet
    pub fn has_funding_service(&self) -> bool {
        self.funding_url.is_some()
    }
}

/// How long and how often to poll for account confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationPolicy {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
}

impl ConfirmationPolicy {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_wait_ms: default_max_wait_ms(),
        }
    }
}

/// Funding service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingSettings {
    /// Amount a freshly created test account receives
    #[serde(default = "default_fund_amount")]
    pub fund_amount: Decimal,

    /// HTTP request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl FundingSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for FundingSettings {
    fn default() -> Self {
        Self {
            fund_amount: default_fund_amount(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

// Default value functions for serde
fn default_operator_fee() -> Decimal {
    Decimal::ONE
}

fn default_precision() -> u32 {
    DEFAULT_PRECISION
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_max_wait_ms() -> u64 {
    30_000
}

fn default_fund_amount() -> Decimal {
    Decimal::new(1_000, 0)
}

fn default_request_timeout_secs() -> u64 {
    30
}
