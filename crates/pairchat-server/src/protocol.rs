//! Wire protocol: JSON text frames tagged by `type`.
//!
//! Frames are validated here and converted into lobby events. Anything that
//! does not parse never reaches the lobby.

use pairchat_common::PairchatError;
use pairchat_lobby::{ClientEvent, ServerEvent};
use serde::{Deserialize, Serialize};

/// Frames a client sends.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Join {
        #[serde(default, alias = "username")]
        name: Option<String>,
        #[serde(default, alias = "gender")]
        category: Option<String>,
    },
    Message {
        text: String,
    },
    Skip,
    Leave,
}

/// Frames the server sends.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Status { text: String },
    Matched { partner_category: String },
    Message { text: String },
    Error { message: String },
}

impl From<ClientFrame> for ClientEvent {
    fn from(frame: ClientFrame) -> Self {
        match frame {
            ClientFrame::Join { name, category } => ClientEvent::Join { name, category },
            ClientFrame::Message { text } => ClientEvent::Message { text },
            ClientFrame::Skip => ClientEvent::Skip,
            ClientFrame::Leave => ClientEvent::Leave,
        }
    }
}

impl From<ServerEvent> for ServerFrame {
    fn from(event: ServerEvent) -> Self {
        match event {
            ServerEvent::Status { text } => ServerFrame::Status { text },
            ServerEvent::Matched { partner_category } => ServerFrame::Matched { partner_category },
            ServerEvent::Message { text } => ServerFrame::Message { text },
        }
    }
}

/// Parse one inbound text frame, rejecting anything over `max_bytes`.
pub fn parse_client_frame(text: &str, max_bytes: usize) -> Result<ClientEvent, PairchatError> {
    if text.len() > max_bytes {
        return Err(PairchatError::Protocol(format!(
            "frame of {} bytes exceeds limit of {max_bytes}",
            text.len()
        )));
    }
    let frame: ClientFrame =
        serde_json::from_str(text).map_err(|e| PairchatError::Protocol(e.to_string()))?;
    Ok(frame.into())
}

pub fn encode_server_frame(frame: &ServerFrame) -> Result<String, PairchatError> {
    serde_json::to_string(frame).map_err(|e| PairchatError::Protocol(e.to_string()))
}
