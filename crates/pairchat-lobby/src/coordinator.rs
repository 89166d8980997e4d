//! Single owner of the lobby state.
//!
//! All join/skip/leave/disconnect handling goes through one mutex, so the
//! waiting slot is never observed half-updated. Outbound events are handed
//! to per-connection channels before the lock is released, keeping their
//! order per connection. Delivery uses `try_send`, so a slow reader can
//! never hold up a state transition.

use std::collections::HashMap;
use std::sync::Arc;

use pairchat_common::{ConnectionId, LobbyError, Profile};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

use crate::lobby::{recovery, ConnectionState, Lobby};
use crate::outbound::{Outbound, ServerEvent};
use crate::room_manager::LeaveMode;

/// Lobby state plus the outbound channel of every attached transport.
struct CoordinatorState {
    lobby: Lobby,
    outboxes: HashMap<ConnectionId, mpsc::Sender<ServerEvent>>,
}

/// Point-in-time counts, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbySnapshot {
    pub connections: usize,
    pub rooms: usize,
    pub waiting: Option<ConnectionId>,
}

#[derive(Clone)]
pub struct Coordinator {
    state: Arc<Mutex<CoordinatorState>>,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CoordinatorState {
                lobby: Lobby::new(),
                outboxes: HashMap::new(),
            })),
        }
    }

    /// Attach a transport's outbound channel. Events for `id` are dropped
    /// until this is called.
    pub async fn attach(&self, id: &ConnectionId, tx: mpsc::Sender<ServerEvent>) {
        self.state.lock().await.outboxes.insert(id.clone(), tx);
    }

    pub async fn join(&self, id: &ConnectionId, profile: Profile) {
        self.apply(|lobby| lobby.join(id, profile)).await;
    }

    pub async fn relay(&self, id: &ConnectionId, text: String) {
        self.apply(|lobby| lobby.relay(id, text)).await;
    }

    pub async fn skip(&self, id: &ConnectionId) {
        self.apply(|lobby| lobby.leave_or_skip(id, LeaveMode::Skip))
            .await;
    }

    pub async fn leave(&self, id: &ConnectionId) {
        self.apply(|lobby| lobby.leave_or_skip(id, LeaveMode::Leave))
            .await;
    }

    /// Tear down everything `id` owned and forget its channel.
    pub async fn disconnect(&self, id: &ConnectionId) {
        self.apply(|lobby| Ok(lobby.on_disconnect(id))).await;
        self.state.lock().await.outboxes.remove(id);
    }

    pub async fn state_of(&self, id: &ConnectionId) -> ConnectionState {
        self.state.lock().await.lobby.state_of(id)
    }

    pub async fn snapshot(&self) -> LobbySnapshot {
        let state = self.state.lock().await;
        LobbySnapshot {
            connections: state.lobby.registry().len(),
            rooms: state.lobby.room_count(),
            waiting: state.lobby.slot().occupant().cloned(),
        }
    }

    /// Run `op` against the lobby and deliver its events, all under the
    /// lock so each connection sees events in the order they were produced.
    async fn apply<F>(&self, op: F)
    where
        F: FnOnce(&mut Lobby) -> Result<Vec<Outbound>, LobbyError>,
    {
        let mut state = self.state.lock().await;
        let events = match op(&mut state.lobby) {
            Ok(events) => events,
            Err(e) => {
                debug!(connection = %e.connection(), error = %e, "Recovered lobby error");
                recovery(&e)
            }
        };

        for outbound in events {
            let Some(tx) = state.outboxes.get(&outbound.to) else {
                continue;
            };
            match tx.try_send(outbound.event) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(connection = %outbound.to, "Outbound buffer full, dropping event");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    state.lobby.mark_unreachable(&outbound.to);
                }
            }
        }
    }
}
