//! Message relay and room teardown.

use pairchat_common::{ConnectionId, LobbyError, RoomId};
use tracing::{debug, info};

use crate::lobby::{recovery, Lobby};
use crate::matchmaker::Pairing;
use crate::outbound::{status, Outbound, ServerEvent};
use crate::room::Room;

/// How a connection is leaving its current room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveMode {
    /// Find someone else; the skipper stays registered.
    Skip,
    /// Done chatting; the leaver is deregistered.
    Leave,
}

impl Lobby {
    /// Deliver `text` to the sender's partner, never back to the sender.
    pub fn relay(&mut self, sender: &ConnectionId, text: String) -> Result<Vec<Outbound>, LobbyError> {
        let (_, partner) = self
            .active_partner(sender)
            .ok_or_else(|| LobbyError::NoActiveRoom(sender.clone()))?;
        Ok(vec![Outbound::new(&partner, ServerEvent::Message { text })])
    }

    pub fn leave_or_skip(
        &mut self,
        id: &ConnectionId,
        mode: LeaveMode,
    ) -> Result<Vec<Outbound>, LobbyError> {
        let mut out = Vec::new();

        match mode {
            LeaveMode::Skip => {
                if !self.registry.contains(id) {
                    return Err(LobbyError::UnknownConnection(id.clone()));
                }
                let partner = self.teardown(id, status::PARTNER_LEFT, &mut out);
                // The room is already gone at this point, so a failed search
                // for the skipper must not discard the partner's events.
                match self.request_pairing(id, partner.as_ref(), &mut out) {
                    Ok(Pairing::Waiting | Pairing::AlreadyWaiting) => {
                        out.push(Outbound::status(id, status::SEARCHING_AGAIN));
                    }
                    Ok(Pairing::Parked) => out.push(Outbound::status(id, status::PARKED)),
                    Ok(Pairing::Matched(_)) => {}
                    Err(e) => {
                        debug!(error = %e, "Skipper not requeued");
                        out.extend(recovery(&e));
                    }
                }
            }
            LeaveMode::Leave => {
                self.teardown(id, status::PARTNER_LEFT, &mut out);
                self.slot.clear_if(id);
                if self.registry.deregister(id).is_some() {
                    info!(connection = %id, "Connection left");
                }
            }
        }

        Ok(out)
    }

    /// Transport-level disconnect. Safe to call any number of times: once
    /// the connection is deregistered and out of the slot this is a no-op.
    pub fn on_disconnect(&mut self, id: &ConnectionId) -> Vec<Outbound> {
        let mut out = Vec::new();
        if self.slot.clear_if(id) {
            debug!(connection = %id, "Cleared waiting slot on disconnect");
        }
        if !self.registry.contains(id) {
            return out;
        }
        self.teardown(id, status::PARTNER_DISCONNECTED, &mut out);
        self.registry.deregister(id);
        out
    }

    /// The room `id` is in and the other member, if the room is intact.
    /// A room reference that no longer resolves is cleared on the way.
    fn active_partner(&mut self, id: &ConnectionId) -> Option<(RoomId, ConnectionId)> {
        let room_id = self.registry.room_of(id)?.clone();
        let partner = self
            .rooms
            .get(&room_id)
            .and_then(|room| room.other_member(id))
            .cloned();
        if partner.is_none() {
            debug!(connection = %id, room = %room_id, "Dropping dangling room reference");
            let _ = self.registry.set_room(id, None);
        }
        partner.map(|p| (room_id, p))
    }

    /// Dissolve the room `id` is in, tell the partner with `notice`, and put
    /// the partner back into matchmaking. Returns the former partner.
    fn teardown(
        &mut self,
        id: &ConnectionId,
        notice: &str,
        out: &mut Vec<Outbound>,
    ) -> Option<ConnectionId> {
        let (room_id, partner) = self.active_partner(id)?;
        out.push(Outbound::status(&partner, notice));
        if let Some(room) = self.dissolve(&room_id) {
            info!(room = %room.id(), "Room dissolved");
        }
        self.requeue(&partner, out);
        Some(partner)
    }

    /// Remove the room and clear both members' references in one step.
    fn dissolve(&mut self, room_id: &RoomId) -> Option<Room> {
        let room = self.rooms.remove(room_id)?;
        for member in room.members() {
            if self.registry.room_of(member) == Some(room_id) {
                let _ = self.registry.set_room(member, None);
            }
        }
        Some(room)
    }

    /// Send a freed member back to matchmaking. If someone is already
    /// waiting the member is paired with them rather than evicting them.
    fn requeue(&mut self, id: &ConnectionId, out: &mut Vec<Outbound>) {
        match self.request_pairing(id, None, out) {
            Ok(Pairing::Matched(room)) => {
                debug!(connection = %id, room = %room, "Requeued member matched");
            }
            Ok(_) => debug!(connection = %id, "Requeued member waiting"),
            Err(e) => debug!(error = %e, "Requeue skipped"),
        }
    }
}
