//! # maxcubed — cube client daemon
//!
//! Composition root that wires the cube adapter and logs what it reports.
//!
//! ## Responsibilities
//! - Parse configuration (`maxcube.toml`, env vars)
//! - Initialise `tracing` with the configured filter
//! - Start the cube client and log every event it publishes
//! - Run the optional `MAXCUBE_COMMAND` once its target device is known
//! - Stop on Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no protocol logic belongs here.

mod command;
mod config;
mod events;

use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use maxcube_adapter_tcp::CubeClient;
use maxcube_domain::event::CubeEvent;

use crate::command::OneShot;
use crate::config::Config;

/// Wait for an update in which `command` can run, then run it.
async fn run_when_ready(
    client: &CubeClient,
    command: OneShot,
    mut updates: broadcast::Receiver<CubeEvent>,
) {
    loop {
        match updates.recv().await {
            Ok(CubeEvent::Update(registry)) if command.is_ready(&registry) => break,
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }

    let address = command.address();
    match command.run(client).await {
        Ok(()) => tracing::info!(%address, "command accepted"),
        Err(err) => tracing::error!(%address, error = %err, "command failed"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();
    let command = OneShot::from_env()?;

    let client = CubeClient::connect(config.cube);
    let logger = tokio::spawn(events::log_events(client.subscribe()));
    let updates = client.subscribe();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    if let Some(command) = command {
        tokio::select! {
            () = run_when_ready(&client, command, updates) => {}
            result = &mut shutdown => {
                result?;
                client.shutdown().await;
                logger.await?;
                return Ok(());
            }
        }
    }

    shutdown.await?;
    tracing::info!("shutting down");
    client.shutdown().await;
    logger.await?;
    Ok(())
}
