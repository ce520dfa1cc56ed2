//! Account Orchestrator - balance reads and linked transfers
//!
//! Every outbound transfer is one logical operation made of two ledger
//! submissions, strictly in this order:
//!
//! ```text
//! validate amount ──► Validation (no I/O)
//!       │
//!       ▼
//! [lane] balance < amount + fee ──► TransferRejected (nothing submitted)
//!       │
//!       ▼
//!       recipient leg ──fail──► TransferRejected / Network (no operator leg)
//!       │ ok
//!       ▼
//!        operator leg  ──fail──► PartialTransfer (recipient leg stays committed)
//!       │ ok
//!       ▼
//!     Ok(())
//! ```
//!
//! Nothing is retried here: ledger transfers are not idempotent.

use relaypay_config::EnvironmentConfig;
use relaypay_core::{Address, Amount};
use relaypay_gateway::{GatewayError, LedgerGateway, TransferRequest, MAX_MEMO_BYTES};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::account::ConfirmedAccount;
use crate::error::{WalletError, WalletResult};

const TRANSFER_TAG: &str = "transfer";
const FEE_TAG: &str = "fee";

/// Balance queries and transfers for a confirmed account
pub struct AccountOrchestrator {
    account: Arc<ConfirmedAccount>,
    gateway: Arc<dyn LedgerGateway>,
    env: Arc<EnvironmentConfig>,
    recipient: Address,
    operator_fee: Amount,
}

impl AccountOrchestrator {
    /// Create an orchestrator whose `transfer_out` pays `recipient`
    pub fn new(
        account: Arc<ConfirmedAccount>,
        gateway: Arc<dyn LedgerGateway>,
        env: Arc<EnvironmentConfig>,
        recipient: Address,
    ) -> WalletResult<Self> {
        let operator_fee = Amount::with_precision(env.operator_fee, env.precision)
            .map_err(|e| WalletError::Configuration(format!("operator fee: {}", e)))?;

        for tag in [TRANSFER_TAG, FEE_TAG] {
            let memo = memo(&env.app_id, tag);
            if memo.len() > MAX_MEMO_BYTES {
                return Err(WalletError::Configuration(format!(
                    "app id '{}' is too long: memo '{}' exceeds {} bytes",
                    env.app_id, memo, MAX_MEMO_BYTES
                )));
            }
        }

        Ok(Self {
            account,
            gateway,
            env,
            recipient,
            operator_fee,
        })
    }

    pub fn address(&self) -> &Address {
        self.account.address()
    }

    pub fn recipient(&self) -> &Address {
        &self.recipient
    }

    pub fn operator_address(&self) -> &Address {
        &self.env.operator_address
    }

    pub fn operator_fee(&self) -> Amount {
        self.operator_fee
    }

    /// Current balance, read from the ledger on every call
    pub async fn get_current_balance(&self) -> WalletResult<Decimal> {
        let balance = self
            .gateway
            .balance(self.account.address())
            .await
            .map_err(WalletError::from_query)?;

        tracing::debug!(address = %self.account.address(), balance = %balance, "Read balance");
        Ok(balance)
    }

    /// Send `amount` to the configured recipient, plus the operator payment
    pub async fn transfer_out(&self, amount: Decimal) -> WalletResult<()> {
        let recipient = self.recipient.clone();
        self.transfer_to(amount, &recipient).await
    }

    /// Send `amount` to `destination`, plus the operator payment
    pub async fn transfer_to(&self, amount: Decimal, destination: &Address) -> WalletResult<()> {
        let (amount, total) = self.validate(amount, destination)?;

        let _lane = self.account.acquire_lane().await;
        let source = self.account.keypair();

        // Submissions on this account go through the lane, so the balance holds until step 2
        let available = self
            .gateway
            .balance(self.account.address())
            .await
            .map_err(WalletError::from_query)?;
        if total > available {
            tracing::warn!(
                source = %self.account.address(),
                available = %available,
                requested = %total,
                "Balance does not cover transfer and operator payment"
            );
            return Err(WalletError::TransferRejected(
                GatewayError::InsufficientBalance {
                    available,
                    requested: total,
                },
            ));
        }

        let primary = TransferRequest::new(destination.clone(), amount)
            .with_memo(memo(&self.env.app_id, TRANSFER_TAG));
        let primary_id = self
            .gateway
            .submit_transfer(source, &primary)
            .await
            .map_err(|e| {
                tracing::warn!(
                    source = %self.account.address(),
                    destination = %destination,
                    amount = %amount,
                    error = %e,
                    "Transfer failed, operator payment skipped"
                );
                WalletError::from_submission(e)
            })?;

        tracing::info!(
            tx = %primary_id,
            source = %self.account.address(),
            destination = %destination,
            amount = %amount,
            "Transfer committed"
        );

        let fee = TransferRequest::new(self.env.operator_address.clone(), self.operator_fee)
            .with_memo(memo(&self.env.app_id, FEE_TAG));

        match self.gateway.submit_transfer(source, &fee).await {
            Ok(fee_id) => {
                tracing::info!(
                    tx = %fee_id,
                    operator = %self.env.operator_address,
                    amount = %self.operator_fee,
                    "Operator payment committed"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    primary_tx = %primary_id,
                    operator = %self.env.operator_address,
                    amount = %self.operator_fee,
                    error = %e,
                    "Operator payment failed after committed transfer, needs reconciliation"
                );
                Err(WalletError::PartialTransfer {
                    primary: primary_id,
                    fee_error: e,
                })
            }
        }
    }

    /// Checked amount and the total debit including the operator payment
    fn validate(&self, amount: Decimal, destination: &Address) -> WalletResult<(Amount, Decimal)> {
        let amount = Amount::with_precision(amount, self.env.precision)
            .map_err(|e| WalletError::Validation(e.to_string()))?;

        let total = amount.checked_add(&self.operator_fee).ok_or_else(|| {
            WalletError::Validation(format!("{} plus operator fee overflows", amount))
        })?;

        if destination == self.account.address() {
            return Err(WalletError::Validation(
                "Destination is the sending account".to_string(),
            ));
        }

        Ok((amount, total.value()))
    }
}

/// Memo format: `1-<app id>-<tag>`
fn memo(app_id: &str, tag: &str) -> String {
    format!("1-{}-{}", app_id, tag)
}
