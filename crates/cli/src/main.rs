//! RelayPay CLI - Main entry point

use relaypay_cli::{commands, AppContext};
use relaypay_config::Environment;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "relaypay")]
#[command(about = "RelayPay - wallet client with linked operator payments", long_about = None)]
struct Cli {
    /// Built-in environment profile (test, production)
    #[arg(short, long, default_value = "test")]
    env: Environment,

    /// TOML profile file, replaces the built-in profile
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved environment
    Env,

    /// Generate an account key into a keystore file
    Keygen {
        /// Keystore file path
        #[arg(long, default_value = "relaypay-keys.json")]
        output: PathBuf,
    },

    /// Create (or top up) an account through the funding service
    Fund {
        /// Account address (hex public key)
        address: String,
        /// Top-up amount; omit to create the account
        #[arg(long)]
        amount: Option<Decimal>,
    },

    /// Provision an account and run transfers against an in-memory ledger
    Simulate {
        /// Amount per transfer
        #[arg(long, default_value = "200")]
        amount: Decimal,
        /// Number of transfers
        #[arg(long, default_value = "2")]
        times: u32,
        /// Existence checks before a new account becomes visible
        #[arg(long, default_value = "2")]
        lag: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    let ctx = AppContext::new(cli.env, cli.config.as_deref())?;

    match cli.command {
        Commands::Env => {
            commands::show_env(&ctx);
        }

        Commands::Keygen { output } => {
            commands::keygen(&output).await?;
        }

        Commands::Fund { address, amount } => {
            commands::fund(&ctx, &address, amount).await?;
        }

        Commands::Simulate { amount, times, lag } => {
            commands::simulate(&ctx, amount, times, lag).await?;
        }
    }

    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
