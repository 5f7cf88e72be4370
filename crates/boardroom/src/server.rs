//! `BoardroomServer` builder and server loop.
//!
//! Ties the layers together: transport → protocol → coordinator. Also
//! owns the only background activity in the system, the periodic room
//! expiry sweep.

use std::sync::Arc;
use std::time::{Duration, Instant};

use boardroom_protocol::JsonCodec;
use boardroom_room::RoomConfig;
use boardroom_transport::{Transport, TransportError, WebSocketTransport};
use tokio::sync::Mutex;

use crate::coordinator::Coordinator;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
///
/// The single `Mutex` around the whole coordinator is deliberate: room
/// lifetimes are short and contention is low, so one global critical
/// section beats fine-grained per-room locking on simplicity.
pub(crate) struct ServerState {
    pub(crate) coordinator: Mutex<Coordinator>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Boardroom server.
///
/// # Example
///
/// ```rust,no_run
/// use boardroom::BoardroomServer;
///
/// # async fn run() -> Result<(), boardroom::TransportError> {
/// let server = BoardroomServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct BoardroomServerBuilder {
    bind_addr: String,
    ws_path: String,
    room_config: RoomConfig,
}

impl BoardroomServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            ws_path: "/ws".to_string(),
            room_config: RoomConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the WebSocket upgrade path (default `/ws`).
    pub fn ws_path(mut self, path: &str) -> Self {
        self.ws_path = path.to_string();
        self
    }

    /// Sets room capacity and expiry policy.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Binds the transport and assembles the server.
    pub async fn build(self) -> Result<BoardroomServer, TransportError> {
        let transport =
            WebSocketTransport::bind(&self.bind_addr, &self.ws_path).await?;

        let sweep_interval = self.room_config.sweep_interval;
        let state = Arc::new(ServerState {
            coordinator: Mutex::new(Coordinator::new(self.room_config)),
            codec: JsonCodec,
        });

        Ok(BoardroomServer {
            transport,
            state,
            sweep_interval,
        })
    }
}

impl Default for BoardroomServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Boardroom session coordinator.
///
/// Call [`run()`](Self::run) to start the sweep task and accept
/// connections.
pub struct BoardroomServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
    sweep_interval: Duration,
}

impl BoardroomServer {
    /// Creates a new builder.
    pub fn builder() -> BoardroomServerBuilder {
        BoardroomServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server: spawns the expiry sweep, then accepts incoming
    /// connections and hands each to its own handler task. Runs until
    /// the process is terminated.
    pub async fn run(mut self) -> Result<(), TransportError> {
        tracing::info!("boardroom coordinator running");

        spawn_sweeper(Arc::clone(&self.state), self.sweep_interval);

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(handle_connection(conn, state));
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Spawns the periodic expiry sweep.
///
/// The sweep locks the same coordinator mutex as command handling, so
/// its deletions are atomic single steps from the handlers' perspective
/// — it can never observe (or create) a half-applied mutation.
fn spawn_sweeper(state: Arc<ServerState>, period: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick fires immediately; nothing can have expired yet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let mut coordinator = state.coordinator.lock().await;
            coordinator.sweep(Instant::now());
        }
    });
}
