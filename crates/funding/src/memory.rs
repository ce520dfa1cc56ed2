//! In-process faucet backed by an in-memory ledger

use async_trait::async_trait;
use relaypay_core::{Address, Amount};
use relaypay_gateway::{GatewayError, InMemoryLedger};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{FundingError, FundingResult};
use crate::types::{FundingReceipt, FundingService};

/// Faucet that creates accounts directly on an [`InMemoryLedger`]
pub struct InMemoryFaucet {
    ledger: Arc<InMemoryLedger>,
    fund_amount: Decimal,
    requests: AtomicUsize,
}

impl InMemoryFaucet {
    pub fn new(ledger: Arc<InMemoryLedger>, fund_amount: Decimal) -> Self {
        Self {
            ledger,
            fund_amount,
            requests: AtomicUsize::new(0),
        }
    }

    /// Number of requests received so far
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FundingService for InMemoryFaucet {
    async fn create_account(&self, address: &Address) -> FundingResult<FundingReceipt> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.ledger
            .create_account(address, self.fund_amount)
            .map_err(|e| match &e {
                GatewayError::AccountExists(_) => FundingError::AlreadyExists(e.to_string()),
                _ => FundingError::Rejected(e.to_string()),
            })?;
        Ok(FundingReceipt::default())
    }

    async fn fund(&self, address: &Address, amount: Amount) -> FundingResult<FundingReceipt> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.ledger
            .credit(address, amount.value())
            .map_err(|e| FundingError::Rejected(e.to_string()))?;
        Ok(FundingReceipt::default())
    }
}
