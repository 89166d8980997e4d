use pairchat_common::{ConnectionId, RoomId};

/// An active pairing of exactly two distinct connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    id: RoomId,
    members: [ConnectionId; 2],
}

impl Room {
    /// Pair `waiting` with `arriving`. Returns `None` for a self-pairing.
    pub fn new(waiting: &ConnectionId, arriving: &ConnectionId) -> Option<Self> {
        if waiting == arriving {
            return None;
        }
        Some(Self {
            id: RoomId::for_pair(waiting, arriving),
            members: [waiting.clone(), arriving.clone()],
        })
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn members(&self) -> &[ConnectionId; 2] {
        &self.members
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.members.contains(id)
    }

    /// The member that is not `id`, if `id` belongs to this room.
    pub fn other_member(&self, id: &ConnectionId) -> Option<&ConnectionId> {
        match &self.members {
            [a, b] if a == id => Some(b),
            [a, b] if b == id => Some(a),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_room_has_two_members() {
        let a = ConnectionId::from("a");
        let b = ConnectionId::from("b");
        let room = Room::new(&a, &b).unwrap();
        assert_eq!(room.members(), &[a.clone(), b.clone()]);
        assert_eq!(room.id().as_str(), "room_a_b");
        assert!(room.contains(&a));
        assert!(room.contains(&b));
    }

    #[test]
    fn self_pairing_is_rejected() {
        let a = ConnectionId::from("a");
        assert!(Room::new(&a, &a).is_none());
    }

    #[test]
    fn other_member() {
        let a = ConnectionId::from("a");
        let b = ConnectionId::from("b");
        let c = ConnectionId::from("c");
        let room = Room::new(&a, &b).unwrap();
        assert_eq!(room.other_member(&a), Some(&b));
        assert_eq!(room.other_member(&b), Some(&a));
        assert_eq!(room.other_member(&c), None);
    }
}
