//! Funding service contract

use async_trait::async_trait;
use relaypay_core::{Address, Amount};
use serde::{Deserialize, Serialize};

use crate::error::FundingResult;

/// Acknowledgement from the funding service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingReceipt {
    /// Ledger transaction that created or funded the account, when reported
    pub transaction: Option<String>,
}

/// Funding Service trait - interface to a faucet
///
/// Implementations can be:
/// - HttpFundingClient: the test network's faucet over HTTP
/// - InMemoryFaucet: funds accounts on an in-memory ledger
#[async_trait]
pub trait FundingService: Send + Sync {
    /// Create `address` on the ledger with the faucet's fixed starting balance.
    ///
    /// Safe to call once per unfunded account.
    async fn create_account(&self, address: &Address) -> FundingResult<FundingReceipt>;

    /// Top up an existing account
    async fn fund(&self, address: &Address, amount: Amount) -> FundingResult<FundingReceipt>;
}
