use crate::id::ConnectionId;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Per-connection failures inside the lobby. None of these are fatal: each
/// one is resolved locally and the coordinator keeps running.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    /// A stored slot or room reference points at a connection that has
    /// gone away or already moved on.
    #[error("stale reference to connection {0}")]
    StaleReference(ConnectionId),

    #[error("connection {0} has no active room")]
    NoActiveRoom(ConnectionId),

    #[error("connection {0} is already waiting or paired")]
    DuplicateJoin(ConnectionId),

    #[error("connection {0} is not registered")]
    UnknownConnection(ConnectionId),
}

impl LobbyError {
    /// The connection the error concerns.
    pub fn connection(&self) -> &ConnectionId {
        match self {
            Self::StaleReference(id)
            | Self::NoActiveRoom(id)
            | Self::DuplicateJoin(id)
            | Self::UnknownConnection(id) => id,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PairchatError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("websocket error: {0}")]
    WebSocket(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("port = 0 is out of range".into());
        assert_eq!(
            err.to_string(),
            "config validation error: port = 0 is out of range"
        );
    }

    #[test]
    fn lobby_error_display() {
        let id = ConnectionId::from("abc");
        assert_eq!(
            LobbyError::StaleReference(id.clone()).to_string(),
            "stale reference to connection abc"
        );
        assert_eq!(
            LobbyError::NoActiveRoom(id.clone()).to_string(),
            "connection abc has no active room"
        );
        assert_eq!(
            LobbyError::DuplicateJoin(id.clone()).to_string(),
            "connection abc is already waiting or paired"
        );
        assert_eq!(
            LobbyError::UnknownConnection(id).to_string(),
            "connection abc is not registered"
        );
    }

    #[test]
    fn lobby_error_connection() {
        let id = ConnectionId::from("xyz");
        let err = LobbyError::DuplicateJoin(id.clone());
        assert_eq!(err.connection(), &id);
    }

    #[test]
    fn pairchat_error_from_config() {
        let err: PairchatError = ConfigError::ParseError("bad toml".into()).into();
        assert!(matches!(err, PairchatError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn pairchat_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let err: PairchatError = io_err.into();
        assert!(matches!(err, PairchatError::Io(_)));
        assert!(err.to_string().contains("port taken"));
    }

    #[test]
    fn pairchat_error_other_variants() {
        let err = PairchatError::WebSocket("handshake failed".into());
        assert_eq!(err.to_string(), "websocket error: handshake failed");

        let err = PairchatError::Protocol("unknown type".into());
        assert_eq!(err.to_string(), "protocol error: unknown type");
    }
}
