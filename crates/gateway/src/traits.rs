//! Gateway trait - the ledger operations the wallet core consumes

use async_trait::async_trait;
use relaypay_core::{Address, Amount, Keypair, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};

/// Longest memo the ledger accepts, in bytes
pub const MAX_MEMO_BYTES: usize = 28;

/// A single outbound payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub destination: Address,
    pub amount: Amount,
    pub memo: Option<String>,
}

impl TransferRequest {
    pub fn new(destination: Address, amount: Amount) -> Self {
        Self {
            destination,
            amount,
            memo: None,
        }
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Check ledger-level constraints that do not need network state
    pub fn validate(&self) -> GatewayResult<()> {
        match &self.memo {
            Some(memo) if memo.len() > MAX_MEMO_BYTES => Err(GatewayError::MemoTooLong(memo.len())),
            _ => Ok(()),
        }
    }
}

/// Ledger Gateway - interface to the ledger network
///
/// Implementations own transaction construction, signing, sequence numbers
/// and transport. Implementations can be:
/// - InMemoryLedger: in-process ledger for tests and simulation
/// - An SDK-backed client talking to a real network
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Whether the ledger currently reports the account as existing
    async fn account_exists(&self, address: &Address) -> GatewayResult<bool>;

    /// Current balance, read from the ledger on every call
    async fn balance(&self, address: &Address) -> GatewayResult<Decimal>;

    /// Sign and submit a transfer from `source`.
    ///
    /// Resolves once the ledger has applied the transfer; a subsequent
    /// `balance` call observes it.
    async fn submit_transfer(
        &self,
        source: &Keypair,
        request: &TransferRequest,
    ) -> GatewayResult<TransactionId>;
}
