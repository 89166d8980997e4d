//! The lobby arena: registry, waiting slot and rooms under one owner.
//!
//! Everything here is synchronous bookkeeping. Each operation mutates the
//! arena and returns the events that should go out afterwards; delivery is
//! the [`Coordinator`](crate::Coordinator)'s job.

use std::collections::HashMap;

use pairchat_common::{ConnectionId, LobbyError, Profile, RoomId};
use tracing::debug;

use crate::matchmaker::Pairing;
use crate::outbound::{status, Outbound};
use crate::registry::SessionRegistry;
use crate::room::Room;
use crate::slot::WaitingSlot;

/// Where a connection sits in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not joined, deregistered, or registered without a partner or a slot.
    Idle,
    Waiting,
    Paired(RoomId),
}

#[derive(Debug, Default)]
pub struct Lobby {
    pub(crate) registry: SessionRegistry,
    pub(crate) slot: WaitingSlot,
    pub(crate) rooms: HashMap<RoomId, Room>,
}

impl Lobby {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn slot(&self) -> &WaitingSlot {
        &self.slot
    }

    pub fn room(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn state_of(&self, id: &ConnectionId) -> ConnectionState {
        if self.slot.holds(id) {
            return ConnectionState::Waiting;
        }
        match self.registry.room_of(id) {
            Some(room) => ConnectionState::Paired(room.clone()),
            None => ConnectionState::Idle,
        }
    }

    /// Register (or refresh) a profile and look for a partner.
    ///
    /// A connection that is already waiting or paired gets
    /// [`LobbyError::DuplicateJoin`] and nothing changes.
    pub fn join(
        &mut self,
        id: &ConnectionId,
        profile: Profile,
    ) -> Result<Vec<Outbound>, LobbyError> {
        if self.registry.contains(id) {
            if self.state_of(id) != ConnectionState::Idle {
                return Err(LobbyError::DuplicateJoin(id.clone()));
            }
            self.registry.set_profile(id, profile)?;
        } else {
            self.registry.register(id, profile)?;
        }

        let mut out = Vec::new();
        match self.request_pairing(id, None, &mut out)? {
            Pairing::Waiting | Pairing::AlreadyWaiting => {
                out.push(Outbound::status(id, status::WAITING));
            }
            Pairing::Matched(_) | Pairing::Parked => {}
        }
        Ok(out)
    }

    /// Record that outbound delivery to `id` failed because its transport
    /// is gone. The connection stays registered until its disconnect is
    /// processed, but matchmaking now treats it as stale.
    pub fn mark_unreachable(&mut self, id: &ConnectionId) {
        if self.registry.mark_unreachable(id) {
            debug!(connection = %id, "Connection marked unreachable");
        }
    }
}

/// Local resolution of a per-connection error.
pub fn recovery(err: &LobbyError) -> Vec<Outbound> {
    match err {
        LobbyError::NoActiveRoom(id) => vec![Outbound::status(id, status::STILL_SEARCHING)],
        LobbyError::UnknownConnection(id) => vec![Outbound::status(id, status::JOIN_FIRST)],
        LobbyError::DuplicateJoin(_) | LobbyError::StaleReference(_) => Vec::new(),
    }
}
