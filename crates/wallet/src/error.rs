//! Wallet errors

use relaypay_core::{Address, TransactionId};
use relaypay_funding::FundingError;
use relaypay_gateway::GatewayError;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the provisioner and orchestrator
#[derive(Debug, Error)]
pub enum WalletError {
    /// Bad input, rejected before any I/O
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The ledger could not be reached or answered nonsense
    #[error("Ledger request failed: {0}")]
    Network(GatewayError),

    /// The funding service failed
    #[error("Funding failed: {0}")]
    Funding(#[from] FundingError),

    /// The account never appeared on the ledger
    #[error("Account {address} not confirmed on ledger after {waited:?}")]
    ConfirmationTimeout { address: Address, waited: Duration },

    /// The ledger refused a transfer (balance, destination, sequence)
    #[error("Transfer rejected: {0}")]
    TransferRejected(GatewayError),

    /// The recipient leg committed but the operator leg failed
    #[error("Transfer {primary} committed but operator payment failed: {fee_error}")]
    PartialTransfer {
        primary: TransactionId,
        #[source]
        fee_error: GatewayError,
    },

    /// Local setup is broken (keystore, environment)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for wallet operations
pub type WalletResult<T> = Result<T, WalletError>;

impl WalletError {
    /// Map a gateway error raised by a read (existence check, balance)
    pub fn from_query(error: GatewayError) -> Self {
        match error {
            GatewayError::Keystore(reason) => WalletError::Configuration(reason),
            other => WalletError::Network(other),
        }
    }

    /// Map a gateway error raised by a transfer submission
    pub fn from_submission(error: GatewayError) -> Self {
        match error {
            e if e.is_transport() => WalletError::Network(e),
            GatewayError::Keystore(reason) => WalletError::Configuration(reason),
            other => WalletError::TransferRejected(other),
        }
    }

    /// True for failures talking to the ledger or the funding service
    pub fn is_network(&self) -> bool {
        matches!(self, WalletError::Network(_) | WalletError::Funding(_))
    }

    /// True when the recipient leg committed and only the operator leg failed
    pub fn is_partial(&self) -> bool {
        matches!(self, WalletError::PartialTransfer { .. })
    }
}
