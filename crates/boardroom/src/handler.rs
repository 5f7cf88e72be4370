//! Per-connection handler: decode, dispatch, implicit leave on close.
//!
//! Each accepted connection gets its own task running this handler, plus
//! a writer task that drains the connection's event channel onto the
//! socket. The handler tracks which player (if any) this connection is
//! bound to, so a dropped socket resolves to a leave without scanning
//! the registries.

use std::sync::Arc;

use boardroom_protocol::{ClientCommand, Codec, ServerEvent};
use boardroom_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::coordinator::Membership;
use crate::server::ServerState;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    // The connection's outbound queue. The sender half is what gets
    // bound into the connection registry; the writer task below owns
    // the receiver and performs the actual (fire-and-forget) writes.
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    let writer_conn = conn.clone();
    let codec = state.codec;
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let bytes = match codec.encode(&event) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(%conn_id, error = %e, "failed to encode event");
                    continue;
                }
            };
            if writer_conn.send(&bytes).await.is_err() {
                // Socket is gone; the read loop will observe the close
                // and run the implicit leave.
                break;
            }
        }
    });

    // Which player this connection is currently bound to, if any.
    let mut membership: Option<Membership> = None;

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        match state.codec.decode::<ClientCommand>(&data) {
            Ok(cmd) => {
                // The one global critical section: the command mutates
                // and broadcasts to completion before the lock drops.
                let mut coordinator = state.coordinator.lock().await;
                coordinator.handle_command(&tx, &mut membership, cmd);
            }
            Err(e) => {
                // Malformed payloads and unknown command types both land
                // here; the sender gets one generic error, the
                // connection stays open.
                tracing::debug!(%conn_id, error = %e, "discarding unparseable message");
                let _ = tx.send(ServerEvent::Error {
                    error: "invalid message format".to_string(),
                });
            }
        }
    }

    // Disconnection is modeled as an implicit leave, not a distinct
    // state: no grace period, no session resumption.
    if let Some(membership) = membership.take() {
        let mut coordinator = state.coordinator.lock().await;
        coordinator.handle_disconnect(membership);
    }

    // Dropping `tx` lets the writer task drain and exit.
}
