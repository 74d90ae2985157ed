//! Pastel broadcast channel
//!
//! An in-process stand-in for a same-machine broadcast channel. Peers attach
//! through a `HubEndpoint`, which implements the chat `Transport`.

mod endpoint;
mod hub;

pub use endpoint::spawn_inbound_pump;
pub use endpoint::HubEndpoint;
pub use endpoint::Peer;
pub use hub::BroadcastHub;
