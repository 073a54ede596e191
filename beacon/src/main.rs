//! beacon - CLI for the telemetry buffering engine
//!
//! This tool provides commands for:
//! - Checking telemetry configuration and the offline queue
//! - Recording and flushing events through the full pipeline
//! - Resuming delivery of persisted events after outages
//!
//! Uses XDG Base Directory specification for file locations:
//! - Queue: $XDG_DATA_HOME/beacon/queue.db (~/.local/share/beacon/queue.db)
//! - Config: $XDG_CONFIG_HOME/beacon/config.toml (~/.config/beacon/config.toml)

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use beacon_core::store::{EventStore, SqliteStore};
use beacon_core::transport::{HttpTransport, Transport};
use beacon_core::{Config, Event, EventRepository};

#[derive(Parser)]
#[command(name = "beacon")]
#[command(about = "Client-side telemetry buffering engine")]
#[command(version)]
struct Args {
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show telemetry configuration and offline queue status
    Status,

    /// Record an event and flush it through the pipeline
    Send {
        /// Event name
        #[arg(long)]
        name: String,

        /// Screen the event was reported from
        #[arg(long)]
        screen: Option<String>,

        /// User to attribute the event to
        #[arg(long)]
        user: Option<String>,

        /// Event properties as key=value pairs
        #[arg(long = "prop", value_name = "KEY=VALUE")]
        props: Vec<String>,
    },

    /// Show the number of events waiting in the offline queue
    Pending,

    /// Wipe the offline queue
    Clear,

    /// Re-send events persisted in the offline queue
    Resume,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging if verbose
    let _log_guard = if args.verbose {
        Some(
            beacon_core::logging::init(&config.logging)
                .context("failed to initialize logging")?,
        )
    } else {
        None
    };

    match args.command {
        Command::Status => cmd_status(&config),
        Command::Send {
            name,
            screen,
            user,
            props,
        } => cmd_send(&config, name, screen, user, props).await,
        Command::Pending => cmd_pending(),
        Command::Clear => cmd_clear(),
        Command::Resume => cmd_resume(&config).await,
    }
}

fn open_store() -> Result<SqliteStore> {
    SqliteStore::open(&Config::queue_path()).context("failed to open offline queue")
}

fn cmd_status(config: &Config) -> Result<()> {
    println!("Beacon Telemetry Configuration");
    println!("==============================");
    println!();

    let telemetry = &config.telemetry;

    println!(
        "Server URL:      {}",
        telemetry.server_url.as_deref().unwrap_or("<not set>")
    );
    println!(
        "API Key:         {}",
        if telemetry.api_key.is_some() {
            "<set>"
        } else {
            "<not set>"
        }
    );
    println!("Batch Size:      {}", telemetry.batch_size);
    println!("Batch Interval:  {}ms", telemetry.batch_interval_ms);
    println!("Timeout:         {}s", telemetry.timeout_secs);
    println!("Max Retries:     {}", telemetry.max_retries);
    println!("Initial Delay:   {}ms", telemetry.initial_retry_delay_ms);
    println!("Offline Queue:   {}", telemetry.offline_enabled);
    println!("Queue Capacity:  {}", telemetry.offline_capacity);

    println!();
    if telemetry.is_ready() {
        println!("Status: Ready to deliver");
    } else {
        println!("Status: Not ready (set telemetry.server_url in config.toml)");
        println!();
        println!("  [telemetry]");
        println!("  server_url = \"https://your-ingestion-server.com\"");
        println!("  api_key = \"bk_live_xxxxxxxxxxxx\"");
    }

    let queue_path = Config::queue_path();
    if queue_path.exists() {
        let store = open_store()?;
        let pending = store.read_all().map(|events| events.len()).unwrap_or(0);
        println!();
        println!("Pending Events:  {}", pending);
        if pending > 0 {
            println!("Run 'resume' to deliver them.");
        }
    }

    Ok(())
}

async fn cmd_send(
    config: &Config,
    name: String,
    screen: Option<String>,
    user: Option<String>,
    props: Vec<String>,
) -> Result<()> {
    if !config.telemetry.is_ready() {
        println!("Telemetry is not configured. Run 'status' for details.");
        return Ok(());
    }

    let mut event = Event::new(name);
    if let Some(screen) = screen {
        event = event.with_screen_name(screen);
    }
    if let Some(user) = user {
        event = event.with_user_id(user);
    }
    for prop in props {
        let (key, value) = prop
            .split_once('=')
            .context("properties must be KEY=VALUE")?;
        event = event.with_property(key, value);
    }

    let transport = Arc::new(
        HttpTransport::new(&config.telemetry).context("failed to create transport")?,
    );
    let store = Box::new(open_store()?);
    let repository = EventRepository::new(&config.telemetry, transport, store)
        .context("failed to create repository")?;

    repository.record(event).await.context("invalid event")?;
    let outcome = repository.flush().await?;
    repository.dispose();

    println!("Dispatch outcome: {:?}", outcome);
    Ok(())
}

fn cmd_pending() -> Result<()> {
    let store = open_store()?;
    let pending = store.read_all().context("failed to read offline queue")?;

    println!("{} pending event(s)", pending.len());
    for event in &pending {
        println!("  {}  {}  {}", event.occurred_at, event.id, event.name);
    }
    Ok(())
}

fn cmd_clear() -> Result<()> {
    let store = open_store()?;
    store.clear().context("failed to clear offline queue")?;
    println!("Offline queue cleared");
    Ok(())
}

async fn cmd_resume(config: &Config) -> Result<()> {
    if !config.telemetry.is_ready() {
        println!("Telemetry is not configured. Run 'status' for details.");
        return Ok(());
    }

    let store = open_store()?;
    let pending = store.read_all().context("failed to read offline queue")?;

    if pending.is_empty() {
        println!("No pending events to resume.");
        return Ok(());
    }

    println!("Resending {} pending event(s)...", pending.len());

    let transport =
        HttpTransport::new(&config.telemetry).context("failed to create transport")?;
    transport
        .send(&pending)
        .await
        .context("failed to deliver pending events; they remain queued")?;

    store.clear().context("failed to clear offline queue")?;
    tracing::info!(events = pending.len(), "Resumed delivery of offline queue");
    println!("Delivered {} event(s)", pending.len());

    Ok(())
}
