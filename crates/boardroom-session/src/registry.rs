//! The connection registry: player id → live outbound channel.

use std::collections::HashMap;

use boardroom_protocol::{PlayerId, ServerEvent};
use tokio::sync::mpsc;

/// Channel sender that delivers events to one player's connection.
///
/// The receiving half lives in that connection's writer task, which
/// serializes each event and pushes it onto the socket. Unbounded, so
/// enqueueing never blocks command processing; a slow client's backlog
/// is bounded in practice by the transport's own buffering and the
/// room's message volume.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Tracks which outbound channel belongs to which player.
///
/// Plain owned state — no interior locking. The coordinator serializes
/// access behind its single global critical section, so tests can
/// construct isolated registries without any async scaffolding.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: HashMap<PlayerId, EventSender>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the association, overwriting any prior connection for
    /// this id. A client that reconnects does so as a brand-new join,
    /// but the overwrite keeps a stale binding from shadowing it.
    pub fn bind(&mut self, player_id: PlayerId, sender: EventSender) {
        if self.connections.insert(player_id.clone(), sender).is_some() {
            tracing::debug!(%player_id, "replaced existing connection binding");
        }
    }

    /// Removes the association. Missing ids are a no-op.
    pub fn unbind(&mut self, player_id: &PlayerId) {
        self.connections.remove(player_id);
    }

    /// Delivers an event to one player, best-effort.
    ///
    /// Absent binding or a closed channel (writer task gone) drops the
    /// event silently.
    pub fn send_to(&self, player_id: &PlayerId, event: &ServerEvent) {
        if let Some(sender) = self.connections.get(player_id) {
            let _ = sender.send(event.clone());
        }
    }

    /// Delivers an event to every listed player except `exclude`.
    ///
    /// Used after a room mutation so the actor doesn't receive a
    /// redundant echo of their own join/leave acknowledgment — that is
    /// delivered directly instead.
    pub fn broadcast<'a>(
        &self,
        recipients: impl IntoIterator<Item = &'a PlayerId>,
        event: &ServerEvent,
        exclude: Option<&PlayerId>,
    ) {
        for player_id in recipients {
            if Some(player_id) != exclude {
                self.send_to(player_id, event);
            }
        }
    }

    /// Number of bound connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Returns `true` if no connections are bound.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unbounded senders accept synchronously, so these tests run
    //! without a runtime: send, then assert through `try_recv`.

    use super::*;

    fn pid(id: &str) -> PlayerId {
        PlayerId(id.into())
    }

    fn event() -> ServerEvent {
        ServerEvent::PlayerLeft {
            player_id: pid("gone"),
        }
    }

    #[test]
    fn test_send_to_bound_player_delivers() {
        let mut reg = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        reg.bind(pid("p1"), tx);

        reg.send_to(&pid("p1"), &event());

        assert_eq!(rx.try_recv().unwrap(), event());
    }

    #[test]
    fn test_send_to_unbound_player_is_silent() {
        let reg = ConnectionRegistry::new();
        // Nothing to assert beyond "does not panic" — best-effort
        // delivery swallows the miss.
        reg.send_to(&pid("nobody"), &event());
    }

    #[test]
    fn test_send_to_closed_channel_is_silent() {
        let mut reg = ConnectionRegistry::new();
        let (tx, rx) = mpsc::unbounded_channel();
        reg.bind(pid("p1"), tx);
        drop(rx);

        reg.send_to(&pid("p1"), &event());
    }

    #[test]
    fn test_bind_overwrites_previous_connection() {
        let mut reg = ConnectionRegistry::new();
        let (old_tx, mut old_rx) = mpsc::unbounded_channel();
        let (new_tx, mut new_rx) = mpsc::unbounded_channel();

        reg.bind(pid("p1"), old_tx);
        reg.bind(pid("p1"), new_tx);
        reg.send_to(&pid("p1"), &event());

        assert!(old_rx.try_recv().is_err(), "old channel must be dead");
        assert!(new_rx.try_recv().is_ok());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_unbind_stops_delivery() {
        let mut reg = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        reg.bind(pid("p1"), tx);

        reg.unbind(&pid("p1"));
        reg.send_to(&pid("p1"), &event());

        assert!(rx.try_recv().is_err());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_broadcast_excludes_named_player() {
        let mut reg = ConnectionRegistry::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let (tx3, mut rx3) = mpsc::unbounded_channel();
        reg.bind(pid("p1"), tx1);
        reg.bind(pid("p2"), tx2);
        reg.bind(pid("p3"), tx3);

        let ids = [pid("p1"), pid("p2"), pid("p3")];
        reg.broadcast(ids.iter(), &event(), Some(&pid("p2")));

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_err(), "excluded player must not receive");
        assert!(rx3.try_recv().is_ok());
    }

    #[test]
    fn test_broadcast_without_exclusion_reaches_all() {
        let mut reg = ConnectionRegistry::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        reg.bind(pid("p1"), tx1);
        reg.bind(pid("p2"), tx2);

        let ids = [pid("p1"), pid("p2")];
        reg.broadcast(ids.iter(), &event(), None);

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_broadcast_skips_unbound_recipients() {
        let mut reg = ConnectionRegistry::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        reg.bind(pid("p1"), tx1);

        // p2 is listed in the room but its connection is gone.
        let ids = [pid("p1"), pid("p2")];
        reg.broadcast(ids.iter(), &event(), None);

        assert!(rx1.try_recv().is_ok());
    }
}
