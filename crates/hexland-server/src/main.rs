//! Hexland multiplayer game server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

mod protocol;
mod room;
mod server;

/// Listen address, overridable via `SERVER_ADDR`
const DEFAULT_ADDR: &str = "0.0.0.0:8080";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let addr = std::env::var("SERVER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("invalid SERVER_ADDR: {addr}"))?;

    let state = Arc::new(server::ServerState::new());
    server::run_server(addr, state).await
}
