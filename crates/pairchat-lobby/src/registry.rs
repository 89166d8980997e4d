//! Session registry: one record per joined connection, keyed by id.

use std::collections::HashMap;

use pairchat_common::{ConnectionId, LobbyError, Profile, RoomId};

/// A joined participant.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub profile: Profile,
    /// Room this connection currently belongs to.
    pub room: Option<RoomId>,
    /// Cleared when outbound delivery finds the transport gone.
    pub live: bool,
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record with no room. Fails if the id is already registered.
    pub fn register(&mut self, id: &ConnectionId, profile: Profile) -> Result<(), LobbyError> {
        if self.connections.contains_key(id) {
            return Err(LobbyError::DuplicateJoin(id.clone()));
        }
        self.connections.insert(
            id.clone(),
            Connection {
                id: id.clone(),
                profile,
                room: None,
                live: true,
            },
        );
        Ok(())
    }

    pub fn set_room(&mut self, id: &ConnectionId, room: Option<RoomId>) -> Result<(), LobbyError> {
        let conn = self
            .connections
            .get_mut(id)
            .ok_or_else(|| LobbyError::UnknownConnection(id.clone()))?;
        conn.room = room;
        Ok(())
    }

    pub fn set_profile(&mut self, id: &ConnectionId, profile: Profile) -> Result<(), LobbyError> {
        let conn = self
            .connections
            .get_mut(id)
            .ok_or_else(|| LobbyError::UnknownConnection(id.clone()))?;
        conn.profile = profile;
        Ok(())
    }

    pub fn profile_of(&self, id: &ConnectionId) -> Option<&Profile> {
        self.connections.get(id).map(|c| &c.profile)
    }

    pub fn room_of(&self, id: &ConnectionId) -> Option<&RoomId> {
        self.connections.get(id).and_then(|c| c.room.as_ref())
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    /// Registered and still reachable.
    pub fn is_live(&self, id: &ConnectionId) -> bool {
        self.connections.get(id).is_some_and(|c| c.live)
    }

    /// Flag a connection whose transport has gone away. Returns false if the
    /// id is unknown.
    pub fn mark_unreachable(&mut self, id: &ConnectionId) -> bool {
        match self.connections.get_mut(id) {
            Some(conn) => {
                conn.live = false;
                true
            }
            None => false,
        }
    }

    pub fn deregister(&mut self, id: &ConnectionId) -> Option<Connection> {
        self.connections.remove(id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }
}
