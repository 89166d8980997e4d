//! Anonymous one-on-one matchmaking.
//!
//! Connections join a lobby with a small self-reported profile. The first
//! one to arrive waits in a single slot; the next is paired with it into a
//! two-member room. Rooms relay chat between their members and are torn
//! down when either member skips, leaves or disconnects, at which point
//! the remaining member goes back to matchmaking.
//!
//! [`Lobby`] holds the state machine and is purely synchronous.
//! [`Coordinator`] owns a lobby behind one lock and delivers the events it
//! produces. [`Dispatcher`] is the surface a transport talks to.

pub mod coordinator;
pub mod dispatcher;
pub mod lobby;
pub mod matchmaker;
pub mod outbound;
pub mod registry;
pub mod room;
pub mod room_manager;
pub mod slot;


pub use coordinator::{Coordinator, LobbySnapshot};
pub use dispatcher::{ClientEvent, Dispatcher, Disposition};
pub use lobby::{ConnectionState, Lobby};
pub use matchmaker::Pairing;
pub use outbound::{status, Outbound, ServerEvent};
pub use registry::{Connection, SessionRegistry};
pub use room::Room;
pub use room_manager::LeaveMode;
pub use slot::WaitingSlot;
