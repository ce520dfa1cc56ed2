//! RelayPay Wallet - Account provisioning and transfer orchestration
//!
//! ```text
//! Keystore ──► AccountProvisioner ──(fund, poll)──► ConfirmedAccount
//!                                                        │
//!                                                        ▼
//!                                              AccountOrchestrator
//!                                               ├─ get_current_balance
//!                                               └─ transfer_out
//!                                                   ├─ 1. recipient leg
//!                                                   └─ 2. operator leg
//! ```
//!
//! A [`ConfirmedAccount`] can only be obtained from the provisioner once the
//! ledger reports the account, so the orchestrator never runs against an
//! unconfirmed account.

pub mod account;
pub mod error;
pub mod orchestrator;
pub mod provisioner;

pub use account::{AccountHandle, ConfirmedAccount};
pub use error::{WalletError, WalletResult};
pub use orchestrator::AccountOrchestrator;
pub use provisioner::AccountProvisioner;
