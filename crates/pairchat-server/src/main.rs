//! pairchat-server: WebSocket front end for anonymous one-on-one chat.
//!
//! Accepts WebSocket connections, hands their events to the lobby, and
//! writes lobby events back out as JSON frames. Pairing, relay and room
//! teardown all live in `pairchat-lobby`.

mod config;
mod connection;
mod protocol;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use pairchat_lobby::{Coordinator, Dispatcher};
use tokio::net::TcpListener;

use crate::config::Overrides;
use crate::connection::serve;

#[derive(Parser)]
#[command(name = "pairchat-server", about = "Anonymous one-on-one chat server")]
struct Args {
    /// Optional TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on.
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Address to bind.
    #[arg(long, env = "PAIRCHAT_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> pairchat_common::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pairchat_server=info,pairchat_lobby=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = config::resolve(
        args.config.as_deref(),
        Overrides {
            port: args.port,
            bind_address: args.bind,
        },
    )?;

    let coordinator = Coordinator::new();
    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("pairchat-server listening on {}", addr);

    let stats = coordinator.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(60)).await;
            let snapshot = stats.snapshot().await;
            tracing::debug!(
                connections = snapshot.connections,
                rooms = snapshot.rooms,
                waiting = snapshot.waiting.is_some(),
                "Lobby tick"
            );
        }
    });

    serve(listener, Dispatcher::new(coordinator), Arc::new(config)).await;
    Ok(())
}
