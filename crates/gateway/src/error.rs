//! Gateway errors

use relaypay_core::Address;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors reported by a ledger gateway
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Ledger unreachable: {0}")]
    Unreachable(String),

    #[error("Malformed ledger response: {0}")]
    Malformed(String),

    #[error("Account not found on ledger: {0}")]
    AccountNotFound(Address),

    #[error("Account already exists on ledger: {0}")]
    AccountExists(Address),

    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        available: Decimal,
        requested: Decimal,
    },

    #[error("Invalid destination: {0} does not exist")]
    InvalidDestination(Address),

    #[error("Sequence conflict on account {0}: another submission is in flight")]
    SequenceConflict(Address),

    #[error("Memo is {0} bytes, limit is 28")]
    MemoTooLong(usize),

    #[error("Signature rejected: {0}")]
    Signature(String),

    #[error("Keystore error: {0}")]
    Keystore(String),
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    /// True when the failure happened in transport, not in ledger rules
    pub fn is_transport(&self) -> bool {
        matches!(self, GatewayError::Unreachable(_) | GatewayError::Malformed(_))
    }
}
