use std::net::SocketAddr;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

use locale_sync::config::{AppConfig, SyncConfig};
use locale_sync::error::Error;
use locale_sync::remote::sheets::SheetsClient;
use locale_sync::server;
use locale_sync::services::pack::LanguagePack;
use locale_sync::services::sync::{pull, push};

#[derive(Parser)]
#[command(name = "locale-sync", about = "Language pack / spreadsheet synchronization")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pull remotely edited translations into the local language pack
    Pull,
    /// Push local keys and translations to the remote table
    Push,
    /// Run the health-check web service
    Serve,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let debug = AppConfig::from_env().map(|c| c.debug).unwrap_or(false);
    tracing_subscriber::fmt()
        .with_max_level(if debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Commands::Pull => {
            let cfg = SyncConfig::from_env()?;
            let mut table = connect(&cfg)?;
            let mut pack = LanguagePack::load(&cfg.language_dir)?;
            pull::run(&mut table, &mut pack, &cfg)?;
            Ok(())
        }
        Commands::Push => {
            let cfg = SyncConfig::from_env()?;
            let mut table = connect(&cfg)?;
            let mut pack = LanguagePack::load(&cfg.language_dir)?;
            push::run(&mut table, &mut pack, &cfg)?;
            Ok(())
        }
        Commands::Serve => {
            let cfg = AppConfig::from_env()?;
            let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::run(addr))
        }
    }
}

/// The drivers operate on the sync-facing worksheet.
fn connect(cfg: &SyncConfig) -> Result<SheetsClient, Error> {
    Ok(SheetsClient::connect(
        &cfg.sheet_url,
        &cfg.credential_path,
        &cfg.sync_sheet_name,
    )?)
}
