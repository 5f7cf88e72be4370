//! Boardroom server binary.
//!
//! Binds the coordinator on the given address (first argument, default
//! `127.0.0.1:8080`) and serves WebSocket clients at `/ws` until killed.
//! Rooms are memory-resident and ephemeral; there is nothing to persist
//! or restore across restarts.

use boardroom::BoardroomServer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:8080".to_string());

    let server = BoardroomServer::builder().bind(&addr).build().await?;
    tracing::info!(addr = %server.local_addr()?, "boardroom listening");
    server.run().await?;
    Ok(())
}
