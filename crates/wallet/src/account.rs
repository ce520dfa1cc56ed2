//! Account handles
//!
//! `AccountHandle` is key material the ledger may not know about yet.
//! `ConfirmedAccount` is the same key material after the ledger reported the
//! account; only the provisioner can produce one.

use chrono::{DateTime, Utc};
use relaypay_core::{Address, Keypair};
use tokio::sync::{Mutex, MutexGuard};

/// Local account, not yet known to be on the ledger
#[derive(Debug, Clone)]
pub struct AccountHandle {
    keypair: Keypair,
}

impl AccountHandle {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    pub fn address(&self) -> Address {
        self.keypair.address()
    }
}

/// Account the ledger has confirmed
#[derive(Debug)]
pub struct ConfirmedAccount {
    keypair: Keypair,
    address: Address,
    confirmed_at: DateTime<Utc>,
    /// Serializes submissions so sequence numbers never race
    submission_lane: Mutex<()>,
}

impl ConfirmedAccount {
    pub(crate) fn confirm(handle: AccountHandle) -> Self {
        let address = handle.keypair.address();
        Self {
            keypair: handle.keypair,
            address,
            confirmed_at: Utc::now(),
            submission_lane: Mutex::new(()),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn confirmed_at(&self) -> DateTime<Utc> {
        self.confirmed_at
    }

    pub(crate) fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// Wait for exclusive use of this account's submission lane
    pub(crate) async fn acquire_lane(&self) -> MutexGuard<'_, ()> {
        self.submission_lane.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_keeps_key_material() {
        let keypair = Keypair::generate();
        let handle = AccountHandle::new(keypair.clone());
        assert_eq!(handle.address(), keypair.address());

        let confirmed = ConfirmedAccount::confirm(handle);
        assert_eq!(confirmed.address(), &keypair.address());
        assert_eq!(confirmed.keypair().seed_hex(), keypair.seed_hex());
    }
}
