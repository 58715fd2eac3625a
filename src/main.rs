pub mod config;
pub mod controller;
pub mod eventserver;
pub mod mapping;

use crate::config::Config;
use crate::controller::{CollectorHandle, CollectorSettings};
use crate::eventserver::EventClient;
use crate::mapping::{BridgeEngine, BridgeSettings};
use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Control a Kodi/XBMC media center with a game controller.
#[derive(Parser, Debug)]
#[command(name = "kodipad", version, about)]
struct Cli {
    /// Deadzone for the analog sticks, in percent
    #[arg(short, long, env = "KODIPAD_DEADZONE")]
    deadzone: Option<u8>,

    /// Host running the Kodi EventServer
    #[arg(short = 'H', long, env = "KODIPAD_HOST")]
    host: Option<String>,

    /// EventServer UDP port
    #[arg(short, long, env = "KODIPAD_PORT")]
    port: Option<u16>,

    /// List all connected game controllers and exit
    #[arg(short, long)]
    list: bool,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup(cli.verbose)?;

    if cli.list {
        return list_gamepads();
    }

    let config = Config::load()?.merge_cli(cli.deadzone, cli.host, cli.port)?;
    info!("Starting kodipad with {:?}", config);

    let (snapshot_sender, snapshot_receiver) = mpsc::channel(1000);

    let _collector_handle =
        CollectorHandle::spawn(Some(CollectorSettings::default()), snapshot_sender)
            .map_err(|e| eyre!("Failed to start pad collector: {}", e))?;

    // HELO handshake; a refused handshake is fatal before any timer is armed
    let (client, bytes) =
        EventClient::connect(&config.host, config.port, &config.device_name).await?;
    info!(
        "Connected to {}:{} ({} byte handshake), ctrl-c to quit",
        config.host, config.port, bytes
    );

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received ctrl-c, shutting down");
            ctrl_c_cancel.cancel();
        }
    });

    let settings = BridgeSettings {
        deadzone_percent: config.deadzone_percent,
        ..Default::default()
    };
    let engine = BridgeEngine::create(snapshot_receiver, client, settings).activate();
    let deactivating = engine.run_until_shutdown(cancel).await?;
    deactivating.shutdown().await;

    Ok(())
}

fn setup(verbosity: u8) -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;

    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .init();
    Ok(())
}

fn list_gamepads() -> Result<()> {
    let gilrs =
        gilrs::Gilrs::new().map_err(|e| eyre!("Failed to initialize gamepad backend: {}", e))?;
    let mut found = 0;
    for (id, gamepad) in gilrs.gamepads() {
        println!("{}: {}", id, gamepad.name());
        found += 1;
    }
    if found == 0 {
        println!("no controllers found");
    }
    Ok(())
}
