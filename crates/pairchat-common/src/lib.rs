pub mod errors;
pub mod id;
pub mod profile;

pub use errors::{ConfigError, LobbyError, PairchatError};
pub use id::{new_id, ConnectionId, RoomId};
pub use profile::Profile;

pub type Result<T> = std::result::Result<T, PairchatError>;
