//! RelayPay Gateway - Ledger access contract
//!
//! The wallet core never talks to the network directly. Everything it needs
//! from the ledger goes through [`LedgerGateway`]:
//!
//! ```text
//! ┌──────────────────┐   account_exists / balance   ┌──────────────┐
//! │ Provisioner      │ ───────────────────────────► │              │
//! │ Orchestrator     │   submit_transfer (signed)   │ LedgerGateway│
//! └──────────────────┘ ───────────────────────────► └──────────────┘
//! ```
//!
//! The production SDK implements the trait out of tree. `InMemoryLedger` is
//! a complete in-process ledger used by tests and the simulator, and the
//! `Keystore` implementations persist account key material.

pub mod error;
pub mod keystore;
pub mod memory;
pub mod traits;

pub use error::{GatewayError, GatewayResult};
pub use keystore::{FileKeystore, Keystore, MemoryKeystore};
pub use memory::{InMemoryLedger, TransferRecord};
pub use traits::{LedgerGateway, TransferRequest, MAX_MEMO_BYTES};
