//! Maps inbound transport events onto coordinator operations.

use pairchat_common::{ConnectionId, Profile};
use tokio::sync::mpsc;
use tracing::info;

use crate::coordinator::Coordinator;
use crate::outbound::ServerEvent;

/// An inbound event that already passed transport validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Join {
        name: Option<String>,
        category: Option<String>,
    },
    Message {
        text: String,
    },
    Skip,
    Leave,
}

/// What the transport should do with the link after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Continue,
    Close,
}

#[derive(Clone)]
pub struct Dispatcher {
    coordinator: Coordinator,
}

impl Dispatcher {
    pub fn new(coordinator: Coordinator) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// A transport link came up. Returns the id for all later events.
    pub async fn connected(&self, tx: mpsc::Sender<ServerEvent>) -> ConnectionId {
        let id = ConnectionId::new();
        self.coordinator.attach(&id, tx).await;
        info!(connection = %id, "Connection opened");
        id
    }

    pub async fn handle(&self, id: &ConnectionId, event: ClientEvent) -> Disposition {
        match event {
            ClientEvent::Join { name, category } => {
                let profile = Profile::sanitized(name.as_deref(), category.as_deref());
                self.coordinator.join(id, profile).await;
                Disposition::Continue
            }
            ClientEvent::Message { text } => {
                self.coordinator.relay(id, text).await;
                Disposition::Continue
            }
            ClientEvent::Skip => {
                self.coordinator.skip(id).await;
                Disposition::Continue
            }
            ClientEvent::Leave => {
                self.coordinator.leave(id).await;
                Disposition::Close
            }
        }
    }

    /// The transport link went away, for whatever reason.
    pub async fn disconnected(&self, id: &ConnectionId) {
        self.coordinator.disconnect(id).await;
        info!(connection = %id, "Connection closed");
    }
}
