//! RelayPay Core - Domain types
//!
//! This crate contains the fundamental types shared by every RelayPay crate:
//! - `Amount`: Strictly positive decimal wrapper for transfer amounts
//! - `Address`: Public account address on the ledger
//! - `Keypair`: Ed25519 key material controlling an account
//! - `TransactionId`: Identifier of a submitted ledger transaction

pub mod address;
pub mod amount;
pub mod keypair;
pub mod transaction;

pub use address::{Address, AddressError};
pub use amount::{Amount, AmountError, DEFAULT_PRECISION};
pub use keypair::{KeyError, Keypair};
pub use transaction::TransactionId;
