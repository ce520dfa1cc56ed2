//! Account Provisioner - produces a confirmed, usable account
//!
//! ```text
//! Keystore ──► load or generate key
//!                 │
//!                 ▼
//!        exists on ledger? ──yes──► ConfirmedAccount
//!                 │ no
//!                 ▼
//!        faucet create_account (once; "already exists" falls through)
//!                 │
//!                 ▼
//!        poll account_exists every interval
//!        until visible or max_wait ──► ConfirmationTimeout
//! ```
//!
//! Ledger propagation is asynchronous relative to the faucet call, so the
//! account is only handed out after the poll sees it.

use relaypay_config::EnvironmentConfig;
use relaypay_core::{Address, Keypair};
use relaypay_funding::{FundingError, FundingService};
use relaypay_gateway::{Keystore, LedgerGateway};
use std::sync::Arc;
use tokio::time::Instant;

use crate::account::{AccountHandle, ConfirmedAccount};
use crate::error::{WalletError, WalletResult};

/// Creates or recovers the local account and gates it on ledger confirmation
pub struct AccountProvisioner {
    gateway: Arc<dyn LedgerGateway>,
    keystore: Arc<dyn Keystore>,
    funding: Option<Arc<dyn FundingService>>,
    env: Arc<EnvironmentConfig>,
}

impl AccountProvisioner {
    /// Provisioner without a funding service (accounts are created externally)
    pub fn new(
        gateway: Arc<dyn LedgerGateway>,
        keystore: Arc<dyn Keystore>,
        env: Arc<EnvironmentConfig>,
    ) -> Self {
        Self {
            gateway,
            keystore,
            funding: None,
            env,
        }
    }

    /// Use `funding` to create accounts the ledger does not know yet
    pub fn with_funding(mut self, funding: Arc<dyn FundingService>) -> Self {
        self.funding = Some(funding);
        self
    }

    /// Produce the confirmed account, creating and funding it if needed
    pub async fn get_account(&self) -> WalletResult<ConfirmedAccount> {
        let handle = self.load_or_create().await?;
        let address = handle.address();

        if self
            .gateway
            .account_exists(&address)
            .await
            .map_err(WalletError::from_query)?
        {
            tracing::debug!(address = %address, "Account already on ledger");
            return Ok(ConfirmedAccount::confirm(handle));
        }

        match &self.funding {
            Some(funding) => {
                tracing::info!(
                    address = %address,
                    environment = %self.env.name,
                    "Requesting account creation from funding service"
                );
                match funding.create_account(&address).await {
                    Ok(_) => {}
                    Err(FundingError::AlreadyExists(reason)) => {
                        tracing::info!(
                            address = %address,
                            reason = %reason,
                            "Account already created, waiting for confirmation"
                        );
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            None => {
                tracing::info!(
                    address = %address,
                    "No funding service configured, waiting for external creation"
                );
            }
        }

        self.ensure_account_created(handle).await
    }

    /// Suspend until the ledger reports the account, up to the configured wait
    pub async fn ensure_account_created(
        &self,
        handle: AccountHandle,
    ) -> WalletResult<ConfirmedAccount> {
        let address = handle.address();
        let max_wait = self.env.confirmation.max_wait();
        let started = Instant::now();

        match tokio::time::timeout(max_wait, self.poll_until_visible(&address)).await {
            Ok(Ok(attempts)) => {
                tracing::info!(
                    address = %address,
                    attempts,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Account confirmed on ledger"
                );
                Ok(ConfirmedAccount::confirm(handle))
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                tracing::error!(address = %address, waited = ?max_wait, "Account confirmation timed out");
                Err(WalletError::ConfirmationTimeout {
                    address,
                    waited: max_wait,
                })
            }
        }
    }

    /// Remove every locally stored account
    pub async fn reset(&self) -> WalletResult<()> {
        self.keystore
            .clear()
            .await
            .map_err(|e| WalletError::Configuration(e.to_string()))
    }

    async fn poll_until_visible(&self, address: &Address) -> WalletResult<u32> {
        let interval = self.env.confirmation.poll_interval();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            if self
                .gateway
                .account_exists(address)
                .await
                .map_err(WalletError::from_query)?
            {
                return Ok(attempts);
            }
            tracing::debug!(address = %address, attempts, "Account not visible yet");
            tokio::time::sleep(interval).await;
        }
    }

    async fn load_or_create(&self) -> WalletResult<AccountHandle> {
        let stored = self
            .keystore
            .load()
            .await
            .map_err(|e| WalletError::Configuration(e.to_string()))?;

        let keypair = match stored {
            Some(keypair) => {
                tracing::debug!(address = %keypair.address(), "Recovered stored account");
                keypair
            }
            None => {
                let keypair = Keypair::generate();
                self.keystore
                    .store(&keypair)
                    .await
                    .map_err(|e| WalletError::Configuration(e.to_string()))?;
                tracing::info!(address = %keypair.address(), "Generated new account");
                keypair
            }
        };

        Ok(AccountHandle::new(keypair))
    }
}
