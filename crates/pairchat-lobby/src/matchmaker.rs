//! Claim-or-install matchmaking against the waiting slot.

use pairchat_common::{ConnectionId, LobbyError, RoomId};
use tracing::{debug, info};

use crate::lobby::Lobby;
use crate::outbound::{status, Outbound, ServerEvent};
use crate::room::Room;

/// Result of one [`Lobby::request_pairing`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pairing {
    /// The seeker is now the waiting occupant.
    Waiting,
    /// The seeker was paired with the previous occupant.
    Matched(RoomId),
    /// The occupant is the excluded connection. It keeps the slot and the
    /// seeker stays idle.
    Parked,
    /// The seeker was already the occupant.
    AlreadyWaiting,
}

impl Lobby {
    /// Pair `id` with whoever is waiting, or make it the one waiting.
    ///
    /// The slot is claimed (read and cleared) before anything else looks at
    /// it. A claimed occupant that is unreachable or already in a room is a
    /// stale reference and is dropped; `id` takes the slot instead. `exclude`
    /// names a connection `id` must not be paired with, used so a skipper
    /// never lands back with the partner it just left.
    pub fn request_pairing(
        &mut self,
        id: &ConnectionId,
        exclude: Option<&ConnectionId>,
        out: &mut Vec<Outbound>,
    ) -> Result<Pairing, LobbyError> {
        let seeker = self
            .registry
            .get(id)
            .ok_or_else(|| LobbyError::UnknownConnection(id.clone()))?;
        if !seeker.live {
            return Err(LobbyError::StaleReference(id.clone()));
        }
        if seeker.room.is_some() {
            return Err(LobbyError::DuplicateJoin(id.clone()));
        }

        let Some(partner) = self.slot.claim() else {
            self.slot.install_if_empty(id);
            debug!(connection = %id, "Waiting for a partner");
            return Ok(Pairing::Waiting);
        };

        let Some(room) = Room::new(&partner, id) else {
            self.slot.install_if_empty(id);
            return Ok(Pairing::AlreadyWaiting);
        };

        if exclude == Some(&partner) {
            self.slot.install_if_empty(&partner);
            debug!(connection = %id, excluded = %partner, "Slot held by excluded partner");
            return Ok(Pairing::Parked);
        }

        if let Err(e) = self.validate_occupant(&partner) {
            debug!(error = %e, "Discarding waiting occupant");
            self.slot.install_if_empty(id);
            return Ok(Pairing::Waiting);
        }

        let room_id = room.id().clone();
        self.open_room(room, out)?;
        Ok(Pairing::Matched(room_id))
    }

    fn validate_occupant(&self, id: &ConnectionId) -> Result<(), LobbyError> {
        if self.registry.is_live(id) && self.registry.room_of(id).is_none() {
            Ok(())
        } else {
            Err(LobbyError::StaleReference(id.clone()))
        }
    }

    fn open_room(&mut self, room: Room, out: &mut Vec<Outbound>) -> Result<(), LobbyError> {
        let [first, second] = room.members().clone();
        self.registry.set_room(&first, Some(room.id().clone()))?;
        self.registry.set_room(&second, Some(room.id().clone()))?;

        for (member, other) in [(&first, &second), (&second, &first)] {
            let partner_category = self
                .registry
                .profile_of(other)
                .map(|p| p.category.clone())
                .unwrap_or_default();
            out.push(Outbound::new(member, ServerEvent::Matched { partner_category }));
        }
        for member in [&first, &second] {
            out.push(Outbound::status(member, status::CONNECTED));
        }

        info!(room = %room.id(), "Room opened");
        self.rooms.insert(room.id().clone(), room);
        Ok(())
    }
}
