use std::path::Path;
use std::time::Duration;

use alloy_primitives::Address;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use clawd_types::MintSelection;
use tokio::time;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clawd_console::config::create_example_config;
use clawd_console::{ConsoleConfig, MintOutcome, RpcMintConsole, SwitchOutcome};

#[derive(Parser, Debug)]
#[command(name = "clawd-console")]
#[command(about = "Mint ClawdPFP NFTs on Base and watch the CLAWD burn")]
struct Args {
    /// Path to console configuration file
    #[arg(short, long, default_value = "console.toml")]
    config: String,

    /// Override the ClawdPFP contract address
    #[arg(long)]
    contract: Option<Address>,

    /// Override the JSON-RPC endpoint used for reads
    #[arg(long)]
    rpc_url: Option<String>,

    /// Override the wallet endpoint
    #[arg(long)]
    wallet: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the console once
    Status {
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Keep printing the console until interrupted
    Watch {
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Seconds between redraws
        #[arg(long, default_value_t = 15)]
        every: u64,
    },
    /// Mint PFPs with the connected wallet
    Mint {
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Ask the wallet to switch to the configured network
    SwitchNetwork,
    /// Write a configuration file with default values
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Command::InitConfig = args.command {
        create_example_config(&args.config)?;
        info!("Wrote example configuration to {}", args.config);
        return Ok(());
    }

    let config = load_config(&args)?;
    let console = RpcMintConsole::connect(config).context("Failed to initialise console")?;

    match args.command {
        Command::Status { quantity } => {
            let selection = MintSelection::new(quantity);
            console.start().await;
            console.refresh().await;
            console
                .wait_for_prices(console.config().price_feed.request_timeout())
                .await;
            println!("{}", console.view(selection).await);
            console.stop().await;
        }
        Command::Watch { quantity, every } => {
            let selection = MintSelection::new(quantity);
            console.start().await;

            let mut redraw = time::interval(Duration::from_secs(every.max(1)));
            loop {
                tokio::select! {
                    _ = redraw.tick() => println!("{}", console.view(selection).await),
                    _ = tokio::signal::ctrl_c() => {
                        info!("Received shutdown signal");
                        break;
                    }
                }
            }
            console.stop().await;
        }
        Command::Mint { quantity } => {
            let selection = MintSelection::new(quantity);
            if selection.quantity() != quantity {
                warn!("Quantity {} clamped to {}", quantity, selection.quantity());
            }
            console.refresh().await;

            match console.orchestrator().request_mint(selection).await {
                MintOutcome::Minted { tx_hash, call } => {
                    println!("Minted {} PFP(s) via {}: {}", call.quantity(), call.function_name(), tx_hash);
                }
                MintOutcome::NotReady(state) => bail!("Cannot mint right now: {:?}", state),
                MintOutcome::AlreadySubmitting => bail!("A mint is already in flight"),
                MintOutcome::Failed { error, .. } => bail!("Mint failed: {}", error),
            }
        }
        Command::SwitchNetwork => match console.orchestrator().request_network_switch().await {
            SwitchOutcome::Requested => println!("Switched to {}", console.config().network.name),
            SwitchOutcome::NotNeeded(state) => println!("No switch needed: {:?}", state),
            SwitchOutcome::AlreadySwitching => bail!("A network switch is already in flight"),
            SwitchOutcome::Failed(error) => bail!("Network switch failed: {}", error),
        },
        Command::InitConfig => {}
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<ConsoleConfig> {
    let mut config = if Path::new(&args.config).exists() {
        ConsoleConfig::load(&args.config)?
    } else {
        warn!("Config file {} not found, using defaults", args.config);
        ConsoleConfig::default()
    };

    if let Some(contract) = args.contract {
        config.contract.address = contract;
    }
    if let Some(rpc_url) = &args.rpc_url {
        config.network.rpc_url = rpc_url.clone();
    }
    if let Some(wallet) = &args.wallet {
        config.wallet.endpoint = wallet.clone();
    }

    Ok(config)
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("clawd_console={},clawd_types={}", level, level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
