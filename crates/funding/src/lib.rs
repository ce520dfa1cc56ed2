//! RelayPay Funding - Faucet communicator
//!
//! Creates and pre-funds accounts on test networks. Every call is a single
//! request/response; transport-level failures are reported, never retried.

pub mod error;
pub mod http;
pub mod memory;
pub mod types;

pub use error::{FundingError, FundingResult};
pub use http::HttpFundingClient;
pub use memory::InMemoryFaucet;
pub use types::{FundingReceipt, FundingService};
