//! Events the lobby emits towards connections.

use pairchat_common::ConnectionId;

pub mod status {
    pub const WAITING: &str = "Waiting for a stranger to connect...";
    pub const CONNECTED: &str = "You are now connected to a stranger. Say hi!";
    pub const STILL_SEARCHING: &str = "Still searching for a partner...";
    pub const PARTNER_LEFT: &str = "Partner left the chat. Searching for new partner...";
    pub const PARTNER_DISCONNECTED: &str = "Partner disconnected. Searching for new partner...";
    pub const SEARCHING_AGAIN: &str = "Searching for a new partner...";
    pub const PARKED: &str = "No one else is around yet. Press next to search again.";
    pub const JOIN_FIRST: &str = "Join the lobby before searching for a partner.";
}

/// Payload delivered to a single connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Human-readable system notice.
    Status { text: String },
    /// A partner was found; carries the partner's category.
    Matched { partner_category: String },
    /// Chat text relayed from the partner.
    Message { text: String },
}

impl ServerEvent {
    pub fn status(text: impl Into<String>) -> Self {
        Self::Status { text: text.into() }
    }
}

/// A [`ServerEvent`] addressed to one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub to: ConnectionId,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn new(to: &ConnectionId, event: ServerEvent) -> Self {
        Self {
            to: to.clone(),
            event,
        }
    }

    pub fn status(to: &ConnectionId, text: &str) -> Self {
        Self::new(to, ServerEvent::status(text))
    }
}
