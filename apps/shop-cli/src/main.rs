//! shopctl
//!
//! Operator CLI for the shop: customers, the product catalog and orders
//! stored in MongoDB. Every command prints the response envelope as JSON on
//! stdout and exits non-zero when the operation failed. Logs go to stderr.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_shop::{ConsistencyMode, ShopStore};
use eyre::Result;
use tracing::info;

mod commands;
mod config;

use commands::{CustomerCommand, OrderCommand, ProductCommand};
use config::Config;

#[derive(Parser)]
#[command(name = "shopctl")]
#[command(about = "Manage customers, products and orders")]
struct Cli {
    /// Order workflow semantics; overrides SHOP_CONSISTENCY_MODE
    #[arg(long, global = true)]
    mode: Option<ConsistencyMode>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Customer records
    #[command(subcommand)]
    Customers(CustomerCommand),

    /// Product catalog and stock
    #[command(subcommand)]
    Products(ProductCommand),

    /// Order placement, amendment and status
    #[command(subcommand)]
    Orders(OrderCommand),

    /// Ping MongoDB
    Health,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let cli = Cli::parse();
    let mode = cli.mode.unwrap_or(config.mode);

    info!(
        url = %config.mongodb.redacted_url(),
        database = %config.mongodb.database(),
        %mode,
        "Connecting to MongoDB"
    );
    let store = ShopStore::open(&config.mongodb, Some(config.retry()))
        .await
        .map_err(|e| eyre::eyre!("MongoDB connection failed: {}", e))?;

    let outcome = match cli.command {
        Command::Customers(command) => commands::customers::run(&store, command).await,
        Command::Products(command) => commands::products::run(&store, command).await,
        Command::Orders(command) => commands::orders::run(&store, mode, command).await,
        Command::Health => commands::health(&store).await,
    };

    store.close().await;

    Ok(if outcome? {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
