//! HTTP faucet client
//!
//! Endpoints:
//! - `GET <base>?addr=<address>` creates and funds a new account
//! - `GET <base>/fund?addr=<address>&amount=<n>` tops up an existing account

use async_trait::async_trait;
use relaypay_config::EnvironmentConfig;
use relaypay_core::{Address, Amount};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{FundingError, FundingResult};
use crate::types::{FundingReceipt, FundingService};

/// Body returned by the faucet
#[derive(Debug, Deserialize)]
struct FaucetResponse {
    #[serde(default)]
    hash: Option<String>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Faucet client over HTTP
#[derive(Clone)]
pub struct HttpFundingClient {
    client: Client,
    base_url: String,
}

impl HttpFundingClient {
    pub fn new(base_url: &str, timeout: Duration) -> FundingResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Client for the environment's faucet, or `None` if it has no faucet
    pub fn from_config(config: &EnvironmentConfig) -> FundingResult<Option<Self>> {
        config
            .funding_url
            .as_deref()
            .map(|url| Self::new(url, config.funding.request_timeout()))
            .transpose()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request(&self, url: String, query: &[(&str, String)]) -> FundingResult<FundingReceipt> {
        tracing::debug!(url = %url, "Calling funding service");

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if reports_existing_account(&body) {
                return Err(FundingError::AlreadyExists(body));
            }
            tracing::warn!(status = status.as_u16(), body = %body, "Funding request failed");
            return Err(FundingError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: FaucetResponse = serde_json::from_str(&body)
            .map_err(|e| FundingError::Malformed(format!("{}: {}", e, body)))?;

        if parsed.success == Some(false) {
            let reason = parsed
                .error
                .or(parsed.detail)
                .unwrap_or_else(|| "no reason given".to_string());
            if reports_existing_account(&reason) {
                return Err(FundingError::AlreadyExists(reason));
            }
            return Err(FundingError::Rejected(reason));
        }

        if parsed.hash.is_none() && parsed.success.is_none() {
            return Err(FundingError::Malformed(format!(
                "response has neither 'hash' nor 'success': {}",
                body
            )));
        }

        Ok(FundingReceipt {
            transaction: parsed.hash,
        })
    }
}

/// Faucets answer a second creation request with `op_already_exists`
fn reports_existing_account(text: &str) -> bool {
    let text = text.to_ascii_lowercase();
    text.contains("op_already_exists") || text.contains("already exists")
}

#[async_trait]
impl FundingService for HttpFundingClient {
    async fn create_account(&self, address: &Address) -> FundingResult<FundingReceipt> {
        let receipt = self
            .request(
                self.base_url.clone(),
                &[("addr", address.as_str().to_string())],
            )
            .await?;

        tracing::info!(address = %address, tx = ?receipt.transaction, "Faucet created account");
        Ok(receipt)
    }

    async fn fund(&self, address: &Address, amount: Amount) -> FundingResult<FundingReceipt> {
        let receipt = self
            .request(
                format!("{}/fund", self.base_url),
                &[
                    ("addr", address.as_str().to_string()),
                    ("amount", amount.to_string()),
                ],
            )
            .await?;

        tracing::info!(address = %address, amount = %amount, "Faucet funded account");
        Ok(receipt)
    }
}
