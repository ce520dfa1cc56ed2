//! RelayPay Config - Environment profiles
//!
//! An environment fixes everything the wallet needs to address the outside
//! world: the ledger network, the application identifier, the funding
//! service and the operator wallet. It is selected once at startup and
//! passed to constructors as an immutable value.

pub mod environment;
pub mod loader;

pub use environment::{ConfirmationPolicy, Environment, EnvironmentConfig, FundingSettings};
pub use loader::ConfigError;
