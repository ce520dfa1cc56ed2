//! In-memory ledger
//!
//! A complete ledger living in process memory. It applies transfers
//! atomically, verifies signatures, and models the behaviour of a real
//! network that matters to the wallet core:
//! - propagation lag: new accounts stay invisible for a number of checks
//! - sequence numbers: overlapping submissions from one account conflict
//! - faults: transport outages and per-destination failures can be injected

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use relaypay_core::{Address, Amount, Keypair, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use crate::error::{GatewayError, GatewayResult};
use crate::traits::{LedgerGateway, TransferRequest};

/// A transfer applied by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub id: TransactionId,
    pub source: Address,
    pub destination: Address,
    pub amount: Decimal,
    pub memo: Option<String>,
    pub sequence: u64,
    pub applied_at: DateTime<Utc>,
}

/// Bytes signed by the source account
#[derive(Serialize)]
struct SignedEnvelope<'a> {
    source: &'a Address,
    destination: &'a Address,
    amount: Amount,
    memo: Option<&'a str>,
    sequence: u64,
}

#[derive(Debug)]
struct AccountRecord {
    balance: Decimal,
    sequence: u64,
    /// Existence checks that still report `false`
    hidden_checks: u32,
}

#[derive(Default)]
struct LedgerState {
    accounts: HashMap<Address, AccountRecord>,
    history: Vec<TransferRecord>,
    in_flight: HashSet<Address>,
    destination_faults: HashMap<Address, GatewayError>,
    outage: Option<String>,
}

/// In-process ledger implementing [`LedgerGateway`]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
    confirmation_lag: u32,
    latency: Duration,
    existence_checks: AtomicUsize,
    balance_queries: AtomicUsize,
    submissions: AtomicUsize,
}

impl InMemoryLedger {
    /// Create an empty ledger with instant propagation
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
            confirmation_lag: 0,
            latency: Duration::ZERO,
            existence_checks: AtomicUsize::new(0),
            balance_queries: AtomicUsize::new(0),
            submissions: AtomicUsize::new(0),
        }
    }

    /// New accounts report `false` for the first `checks` existence checks
    pub fn with_confirmation_lag(mut self, checks: u32) -> Self {
        self.confirmation_lag = checks;
        self
    }

    /// Delay applied inside every submission, while the source is in flight
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Create and fund an account (what a faucet does)
    pub fn create_account(&self, address: &Address, balance: Decimal) -> GatewayResult<()> {
        let mut state = self.write_state();
        if state.accounts.contains_key(address) {
            return Err(GatewayError::AccountExists(address.clone()));
        }

        state.accounts.insert(
            address.clone(),
            AccountRecord {
                balance,
                sequence: 0,
                hidden_checks: self.confirmation_lag,
            },
        );

        tracing::debug!(address = %address, balance = %balance, "Ledger account created");
        Ok(())
    }

    /// Credit an existing account
    pub fn credit(&self, address: &Address, amount: Decimal) -> GatewayResult<Decimal> {
        let mut state = self.write_state();
        let record = state
            .accounts
            .get_mut(address)
            .ok_or_else(|| GatewayError::AccountNotFound(address.clone()))?;
        record.balance += amount;
        Ok(record.balance)
    }

    /// Make every call fail as if the network were down (`None` restores it)
    pub fn set_outage(&self, reason: Option<&str>) {
        self.write_state().outage = reason.map(str::to_string);
    }

    /// Fail every transfer to `destination` with `error`
    pub fn fail_transfers_to(&self, destination: &Address, error: GatewayError) {
        self.write_state()
            .destination_faults
            .insert(destination.clone(), error);
    }

    pub fn clear_faults(&self) {
        let mut state = self.write_state();
        state.destination_faults.clear();
        state.outage = None;
    }

    /// Balance without counting as a gateway query
    pub fn peek_balance(&self, address: &Address) -> Option<Decimal> {
        self.read_state()
            .accounts
            .get(address)
            .map(|record| record.balance)
    }

    /// Every transfer applied so far, oldest first
    pub fn transfers(&self) -> Vec<TransferRecord> {
        self.read_state().history.clone()
    }

    pub fn existence_checks(&self) -> usize {
        self.existence_checks.load(Ordering::SeqCst)
    }

    pub fn balance_queries(&self) -> usize {
        self.balance_queries.load(Ordering::SeqCst)
    }

    /// Number of `submit_transfer` calls, accepted or not
    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_outage(state: &LedgerState) -> GatewayResult<()> {
        match &state.outage {
            Some(reason) => Err(GatewayError::Unreachable(reason.clone())),
            None => Ok(()),
        }
    }

    /// Claim the source's sequence slot until the returned guard drops
    fn begin_submission(&self, source: &Address) -> GatewayResult<InFlight<'_>> {
        let mut state = self.write_state();
        Self::check_outage(&state)?;
        if !state.in_flight.insert(source.clone()) {
            return Err(GatewayError::SequenceConflict(source.clone()));
        }
        Ok(InFlight {
            ledger: self,
            source: source.clone(),
        })
    }

    fn apply(&self, source: &Keypair, request: &TransferRequest) -> GatewayResult<TransactionId> {
        let mut state = self.write_state();
        let source_address = source.address();

        if let Some(error) = state.destination_faults.get(&request.destination) {
            return Err(error.clone());
        }

        let (available, sequence) = match state.accounts.get(&source_address) {
            Some(record) if record.hidden_checks == 0 => (record.balance, record.sequence + 1),
            _ => return Err(GatewayError::AccountNotFound(source_address)),
        };

        if !state.accounts.contains_key(&request.destination) {
            return Err(GatewayError::InvalidDestination(request.destination.clone()));
        }

        let requested = request.amount.value();
        if requested > available {
            return Err(GatewayError::InsufficientBalance {
                available,
                requested,
            });
        }

        let envelope = SignedEnvelope {
            source: &source_address,
            destination: &request.destination,
            amount: request.amount,
            memo: request.memo.as_deref(),
            sequence,
        };
        let payload =
            serde_json::to_vec(&envelope).map_err(|e| GatewayError::Malformed(e.to_string()))?;
        let signature = source.sign(&payload);
        source_address
            .verify(&payload, &signature)
            .map_err(|e| GatewayError::Signature(e.to_string()))?;

        if let Some(record) = state.accounts.get_mut(&source_address) {
            record.balance -= requested;
            record.sequence = sequence;
        }
        if let Some(record) = state.accounts.get_mut(&request.destination) {
            record.balance += requested;
        }

        let id = TransactionId::from_payload(&payload);
        state.history.push(TransferRecord {
            id: id.clone(),
            source: source_address,
            destination: request.destination.clone(),
            amount: requested,
            memo: request.memo.clone(),
            sequence,
            applied_at: Utc::now(),
        });

        Ok(id)
    }
}

/// Releases a source account's sequence slot on drop
struct InFlight<'a> {
    ledger: &'a InMemoryLedger,
    source: Address,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.ledger.write_state().in_flight.remove(&self.source);
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerGateway for InMemoryLedger {
    async fn account_exists(&self, address: &Address) -> GatewayResult<bool> {
        self.existence_checks.fetch_add(1, Ordering::SeqCst);

        let mut state = self.write_state();
        Self::check_outage(&state)?;

        match state.accounts.get_mut(address) {
            Some(record) if record.hidden_checks > 0 => {
                record.hidden_checks -= 1;
                Ok(false)
            }
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }

    async fn balance(&self, address: &Address) -> GatewayResult<Decimal> {
        self.balance_queries.fetch_add(1, Ordering::SeqCst);

        let state = self.read_state();
        Self::check_outage(&state)?;

        match state.accounts.get(address) {
            Some(record) if record.hidden_checks == 0 => Ok(record.balance),
            _ => Err(GatewayError::AccountNotFound(address.clone())),
        }
    }

    async fn submit_transfer(
        &self,
        source: &Keypair,
        request: &TransferRequest,
    ) -> GatewayResult<TransactionId> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        request.validate()?;

        let source_address = source.address();
        let slot = self.begin_submission(&source_address)?;

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let result = self.apply(source, request);
        drop(slot);

        match &result {
            Ok(id) => tracing::debug!(
                tx = %id,
                source = %source_address,
                destination = %request.destination,
                amount = %request.amount,
                "Ledger applied transfer"
            ),
            Err(e) => tracing::debug!(
                source = %source_address,
                destination = %request.destination,
                error = %e,
                "Ledger rejected transfer"
            ),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn funded(ledger: &InMemoryLedger, balance: Decimal) -> Keypair {
        let keypair = Keypair::generate();
        ledger.create_account(&keypair.address(), balance).unwrap();
        keypair
    }

    fn request(destination: &Keypair, amount: Decimal) -> TransferRequest {
        TransferRequest::new(destination.address(), Amount::new(amount).unwrap())
    }

    #[tokio::test]
    async fn test_transfer_moves_funds() {
        let ledger = InMemoryLedger::new();
        let alice = funded(&ledger, dec!(1000));
        let bob = funded(&ledger, dec!(0));

        let id = ledger
            .submit_transfer(&alice, &request(&bob, dec!(200)).with_memo("1-rlpy-transfer"))
            .await
            .unwrap();

        assert_eq!(ledger.balance(&alice.address()).await.unwrap(), dec!(800));
        assert_eq!(ledger.balance(&bob.address()).await.unwrap(), dec!(200));

        let history = ledger.transfers();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, id);
        assert_eq!(history[0].sequence, 1);
        assert_eq!(history[0].memo.as_deref(), Some("1-rlpy-transfer"));
    }

    #[tokio::test]
    async fn test_insufficient_balance() {
        let ledger = InMemoryLedger::new();
        let alice = funded(&ledger, dec!(100));
        let bob = funded(&ledger, dec!(0));

        let result = ledger.submit_transfer(&alice, &request(&bob, dec!(150))).await;

        assert!(matches!(result, Err(GatewayError::InsufficientBalance { .. })));
        assert_eq!(ledger.peek_balance(&alice.address()), Some(dec!(100)));
        assert!(ledger.transfers().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_destination() {
        let ledger = InMemoryLedger::new();
        let alice = funded(&ledger, dec!(100));
        let nobody = Keypair::generate();

        let result = ledger.submit_transfer(&alice, &request(&nobody, dec!(1))).await;
        assert!(matches!(result, Err(GatewayError::InvalidDestination(_))));
    }

    #[tokio::test]
    async fn test_confirmation_lag() {
        let ledger = InMemoryLedger::new().with_confirmation_lag(2);
        let alice = funded(&ledger, dec!(10));

        assert!(!ledger.account_exists(&alice.address()).await.unwrap());
        assert!(matches!(
            ledger.balance(&alice.address()).await,
            Err(GatewayError::AccountNotFound(_))
        ));
        assert!(!ledger.account_exists(&alice.address()).await.unwrap());
        assert!(ledger.account_exists(&alice.address()).await.unwrap());
        assert_eq!(ledger.balance(&alice.address()).await.unwrap(), dec!(10));
        assert_eq!(ledger.existence_checks(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_account() {
        let ledger = InMemoryLedger::new();
        let alice = funded(&ledger, dec!(10));
        assert!(matches!(
            ledger.create_account(&alice.address(), dec!(10)),
            Err(GatewayError::AccountExists(_))
        ));
    }

    #[tokio::test]
    async fn test_outage() {
        let ledger = InMemoryLedger::new();
        let alice = funded(&ledger, dec!(10));

        ledger.set_outage(Some("connection refused"));
        assert!(matches!(
            ledger.balance(&alice.address()).await,
            Err(GatewayError::Unreachable(_))
        ));

        ledger.set_outage(None);
        assert_eq!(ledger.balance(&alice.address()).await.unwrap(), dec!(10));
    }

    #[tokio::test]
    async fn test_destination_fault() {
        let ledger = InMemoryLedger::new();
        let alice = funded(&ledger, dec!(10));
        let bob = funded(&ledger, dec!(0));

        ledger.fail_transfers_to(&bob.address(), GatewayError::Unreachable("503".into()));
        let result = ledger.submit_transfer(&alice, &request(&bob, dec!(1))).await;
        assert!(matches!(result, Err(GatewayError::Unreachable(_))));
        assert_eq!(ledger.peek_balance(&alice.address()), Some(dec!(10)));

        ledger.clear_faults();
        assert!(ledger.submit_transfer(&alice, &request(&bob, dec!(1))).await.is_ok());
    }

    #[tokio::test]
    async fn test_overlapping_submissions_conflict() {
        let ledger = Arc::new(InMemoryLedger::new().with_latency(Duration::from_millis(50)));
        let alice = funded(&ledger, dec!(100));
        let bob = funded(&ledger, dec!(0));

        let first = {
            let ledger = Arc::clone(&ledger);
            let alice = alice.clone();
            let req = request(&bob, dec!(1));
            tokio::spawn(async move { ledger.submit_transfer(&alice, &req).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = ledger.submit_transfer(&alice, &request(&bob, dec!(1))).await;

        assert!(matches!(second, Err(GatewayError::SequenceConflict(_))));
        assert!(first.await.unwrap().is_ok());
        assert_eq!(ledger.peek_balance(&bob.address()), Some(dec!(1)));
    }

    #[tokio::test]
    async fn test_sequence_increments() {
        let ledger = InMemoryLedger::new();
        let alice = funded(&ledger, dec!(100));
        let bob = funded(&ledger, dec!(0));

        for _ in 0..3 {
            ledger.submit_transfer(&alice, &request(&bob, dec!(5))).await.unwrap();
        }

        let sequences: Vec<u64> = ledger.transfers().iter().map(|t| t.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
        assert_eq!(ledger.submissions(), 3);
    }
}
