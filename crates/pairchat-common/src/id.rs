use serde::{Deserialize, Serialize};
use std::fmt;

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Identity of one participant's live transport link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(new_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ConnectionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a two-party room, derived from its members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    /// `room_<first>_<second>`, where `first` is the member that was waiting.
    pub fn for_pair(first: &ConnectionId, second: &ConnectionId) -> Self {
        Self(format!("room_{first}_{second}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_id_is_valid_uuid() {
        let id = new_id();
        let parsed = uuid::Uuid::parse_str(&id);
        assert!(parsed.is_ok());
        assert_eq!(parsed.unwrap().get_version_num(), 4);
    }

    #[test]
    fn connection_id_is_unique() {
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn connection_id_display() {
        let id = ConnectionId::new();
        assert_eq!(id.to_string(), id.as_str());
    }

    #[test]
    fn connection_id_from_str() {
        let id = ConnectionId::from("conn-1");
        assert_eq!(id.as_str(), "conn-1");
    }

    #[test]
    fn connection_id_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        let a = ConnectionId::new();
        set.insert(a.clone());
        set.insert(a);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn room_id_for_pair_is_ordered() {
        let a = ConnectionId::from("a");
        let b = ConnectionId::from("b");
        assert_eq!(RoomId::for_pair(&a, &b).as_str(), "room_a_b");
        assert_ne!(RoomId::for_pair(&a, &b), RoomId::for_pair(&b, &a));
    }

    #[test]
    fn room_id_serialization() {
        let room = RoomId::for_pair(&ConnectionId::from("x"), &ConnectionId::from("y"));
        let json = serde_json::to_string(&room).unwrap();
        assert_eq!(json, "\"room_x_y\"");
        let back: RoomId = serde_json::from_str(&json).unwrap();
        assert_eq!(room, back);
    }
}
