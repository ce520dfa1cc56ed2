//! CLI commands

use anyhow::Context;
use relaypay_core::{Address, Amount, Keypair};
use relaypay_funding::{FundingReceipt, FundingService, HttpFundingClient, InMemoryFaucet};
use relaypay_gateway::{FileKeystore, InMemoryLedger, Keystore, MemoryKeystore};
use relaypay_wallet::{AccountOrchestrator, AccountProvisioner};
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::Arc;

use crate::context::AppContext;

/// Print the resolved environment
pub fn show_env(ctx: &AppContext) {
    let env = &ctx.env;

    println!("Environment:      {}", env.name);
    println!("Network:          {} ({})", env.network_url, env.network_id);
    println!("App id:           {}", env.app_id);
    match &env.funding_url {
        Some(url) => println!("Funding service:  {}", url),
        None => println!("Funding service:  none (accounts are created externally)"),
    }
    println!("Operator wallet:  {}", env.operator_address);
    println!("Operator fee:     {}", env.operator_fee);
    println!(
        "Confirmation:     every {:?}, up to {:?}",
        env.confirmation.poll_interval(),
        env.confirmation.max_wait()
    );
}

/// Generate an account key into a keystore file, or report the one already there
pub async fn keygen(output: &Path) -> Result<Address, anyhow::Error> {
    let keystore = FileKeystore::new(output);

    if let Some(existing) = keystore.load().await? {
        let address = existing.address();
        println!("ℹ️  Keystore already holds an account");
        println!("   Address: {}", address);
        return Ok(address);
    }

    let keypair = Keypair::generate();
    keystore.store(&keypair).await?;

    let address = keypair.address();
    println!("✅ Generated account key");
    println!("   Keystore: {}", keystore.path().display());
    println!("   Address:  {}", address);
    Ok(address)
}

/// Ask the environment's faucet to create `address`, or top it up by `amount`
pub async fn fund(
    ctx: &AppContext,
    address: &str,
    amount: Option<Decimal>,
) -> Result<FundingReceipt, anyhow::Error> {
    let address: Address = address
        .parse()
        .with_context(|| format!("invalid address '{}'", address))?;

    let Some(client) = HttpFundingClient::from_config(&ctx.env)? else {
        anyhow::bail!("Environment '{}' has no funding service", ctx.env.name);
    };

    let result = match amount {
        Some(amount) => {
            let amount = Amount::with_precision(amount, ctx.env.precision)?;
            client.fund(&address, amount).await
        }
        None => client.create_account(&address).await,
    };

    let receipt = match result {
        Ok(receipt) => receipt,
        Err(e) if e.is_retryable() => {
            return Err(anyhow::Error::new(e)
                .context("Funding service temporarily unavailable, try again later"));
        }
        Err(e) => return Err(e.into()),
    };

    println!("✅ Funding request accepted by {}", client.base_url());
    if let Some(tx) = &receipt.transaction {
        println!("   Transaction: {}", tx);
    }
    Ok(receipt)
}

/// Balances observed by a simulation run
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub address: Address,
    pub starting_balance: Decimal,
    pub final_balance: Decimal,
    pub recipient_balance: Decimal,
    pub operator_balance: Decimal,
    pub transfers: usize,
}

/// Run the full wallet flow against an in-memory ledger
pub async fn simulate(
    ctx: &AppContext,
    amount: Decimal,
    times: u32,
    confirmation_lag: u32,
) -> Result<SimulationReport, anyhow::Error> {
    let env = Arc::clone(&ctx.env);
    let ledger = Arc::new(InMemoryLedger::new().with_confirmation_lag(confirmation_lag));

    ledger.create_account(&env.operator_address, Decimal::ZERO)?;
    let recipient = Keypair::generate().address();
    ledger.create_account(&recipient, Decimal::ZERO)?;

    let faucet = Arc::new(InMemoryFaucet::new(
        Arc::clone(&ledger),
        env.funding.fund_amount,
    ));
    let provisioner = AccountProvisioner::new(
        ledger.clone(),
        Arc::new(MemoryKeystore::new()),
        env.clone(),
    )
    .with_funding(faucet);

    let account = provisioner.get_account().await?;
    println!(
        "✅ Account confirmed: {} at {}",
        account.address(),
        account.confirmed_at().format("%H:%M:%S%.3f")
    );

    let orchestrator =
        AccountOrchestrator::new(Arc::new(account), ledger.clone(), env.clone(), recipient.clone())?;

    let starting_balance = orchestrator.get_current_balance().await?;
    println!("   Balance: {}", starting_balance);

    for round in 1..=times {
        orchestrator.transfer_out(amount).await?;
        let balance = orchestrator.get_current_balance().await?;
        println!(
            "✅ Transfer {}: {} to recipient, {} to operator, balance {}",
            round,
            amount,
            orchestrator.operator_fee(),
            balance
        );
    }

    let report = SimulationReport {
        address: orchestrator.address().clone(),
        starting_balance,
        final_balance: orchestrator.get_current_balance().await?,
        recipient_balance: ledger.peek_balance(&recipient).unwrap_or_default(),
        operator_balance: ledger
            .peek_balance(orchestrator.operator_address())
            .unwrap_or_default(),
        transfers: ledger.transfers().len(),
    };

    println!("─────────────────────────────");
    println!("Recipient received: {}", report.recipient_balance);
    println!("Operator received:  {}", report.operator_balance);
    println!("Final balance:      {}", report.final_balance);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaypay_config::Environment;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn fast_context(environment: Environment) -> AppContext {
        let mut env = environment.config().unwrap();
        env.confirmation.poll_interval_ms = 5;
        env.confirmation.max_wait_ms = 1_000;
        AppContext::from_config(env)
    }

    #[tokio::test]
    async fn test_keygen_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("keys.json");

        let first = keygen(&path).await.unwrap();
        let second = keygen(&path).await.unwrap();

        assert_eq!(first, second);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_simulate_reports_balances() {
        let ctx = fast_context(Environment::Test);

        let report = simulate(&ctx, dec!(200), 2, 2).await.unwrap();

        assert_eq!(report.starting_balance, dec!(1000));
        assert_eq!(report.final_balance, dec!(598));
        assert_eq!(report.recipient_balance, dec!(400));
        assert_eq!(report.operator_balance, dec!(2));
        assert_eq!(report.transfers, 4);
    }

    #[tokio::test]
    async fn test_simulate_overdraft_fails() {
        let ctx = fast_context(Environment::Test);
        assert!(simulate(&ctx, dec!(5000), 1, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_fund_without_funding_service() {
        let ctx = fast_context(Environment::Production);
        let address = Keypair::generate().address();

        let err = fund(&ctx, address.as_str(), None).await.unwrap_err();
        assert!(err.to_string().contains("no funding service"));
    }

    #[tokio::test]
    async fn test_fund_transport_failure_suggests_retry() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let mut env = Environment::Test.config().unwrap();
        env.funding_url = Some(url);
        let ctx = AppContext::from_config(env);
        let address = Keypair::generate().address();

        let err = fund(&ctx, address.as_str(), None).await.unwrap_err();
        assert!(err.to_string().contains("try again later"));
    }

    #[tokio::test]
    async fn test_fund_rejects_bad_address() {
        let ctx = fast_context(Environment::Test);
        assert!(fund(&ctx, "not-hex", None).await.is_err());
    }
}
