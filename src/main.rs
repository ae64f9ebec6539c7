use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use nft_sell::app::{App, SellOutcome};
use nft_sell::authorization::LocalAuthorizations;
use nft_sell::config::Config;
use nft_sell::listing::Listing;
use nft_sell::logging::{self, LoggingHandle};
use nft_sell::mana::from_mana;
use nft_sell::nft::nft_name;
use nft_sell::ui::terminal_guard::install_panic_hook;
use nft_sell::ui::{SellContext, SellModal};

#[derive(Parser)]
#[command(name = "nft-sell")]
#[command(about = "List an NFT for sale from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the sell dialog for a listing
    Sell {
        /// Listing JSON (nft, optional order, optional wallet)
        listing: PathBuf,

        /// Authorization store file (overrides config)
        #[arg(short, long)]
        authorizations: Option<PathBuf>,
    },

    /// Print how the dialog would open for a listing, without a terminal UI
    Check {
        /// Listing JSON (nft, optional order, optional wallet)
        listing: PathBuf,

        /// Authorization store file (overrides config)
        #[arg(short, long)]
        authorizations: Option<PathBuf>,
    },

    /// Write the effective configuration as a starter config file
    InitConfig {
        /// Destination (default: ~/.config/nft-sell/config.toml)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let dialog_on_screen = matches!(cli.command, Commands::Sell { .. });

    // Session file while the dialog is on screen, stderr otherwise
    let logging_handle = logging::init_logging(&config, dialog_on_screen, cli.debug)?;

    match cli.command {
        Commands::Sell {
            listing,
            authorizations,
        } => {
            cmd_sell(&config, &listing, authorizations, &logging_handle)?;
        }
        Commands::Check {
            listing,
            authorizations,
        } => {
            cmd_check(&config, &listing, authorizations)?;
        }
        Commands::InitConfig { path } => {
            cmd_init_config(&config, path)?;
        }
    }

    Ok(())
}

/// Build the dialog for a listing file
fn build_modal(
    config: &Config,
    listing_path: &Path,
    authorizations: Option<PathBuf>,
) -> Result<SellModal> {
    let listing = Listing::load(listing_path)
        .with_context(|| format!("Failed to load listing {}", listing_path.display()))?;

    let store_path = authorizations.unwrap_or_else(|| config.authorizations_path());
    let store = Arc::new(LocalAuthorizations::load(&store_path)?);
    let translator = Arc::new(config.translator()?);

    let ctx = SellContext {
        contracts: config.contracts.clone(),
        authorizations: store,
        translator,
        default_expiration_days: config.sell.default_expiration_days,
        clock: chrono::Utc::now,
    };
    Ok(SellModal::new(listing, ctx))
}

fn cmd_sell(
    config: &Config,
    listing_path: &Path,
    authorizations: Option<PathBuf>,
    logs: &LoggingHandle,
) -> Result<()> {
    let modal = build_modal(config, listing_path, authorizations)?;

    install_panic_hook();
    let app = App::new(modal, config.ui.refresh_rate_ms);
    let result = app.run();

    if let Some(log_path) = logs.session_log() {
        eprintln!("Session log: {}", log_path.display());
    }

    match result? {
        Some(SellOutcome::OrderCreated(request)) => {
            let out =
                serde_json::to_string_pretty(&request).context("Failed to serialize order")?;
            println!("{out}");
        }
        Some(SellOutcome::Navigated(location)) => {
            eprintln!("Cancelled, returning to {location}");
        }
        None => {
            eprintln!("Interrupted");
        }
    }

    Ok(())
}

fn cmd_check(
    config: &Config,
    listing_path: &Path,
    authorizations: Option<PathBuf>,
) -> Result<()> {
    let modal = build_modal(config, listing_path, authorizations)?;

    let report = json!({
        "name": nft_name(modal.nft()),
        "update": modal.is_update(),
        "price": modal.price.value(),
        "priceWei": from_mana(modal.price.value()).wei().to_string(),
        "expiresAt": modal.expires_at.value(),
        "invalidDate": modal.is_invalid_date(),
        "owner": modal.is_owner(),
        "canSubmit": modal.can_submit(),
        "authorized": modal.has_approval(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_init_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = path
        .or_else(Config::user_config_path)
        .context("No config directory available, pass --path")?;
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    config.save_to(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
