//! Traits implemented by the collaborators around the pairing engine.

pub mod channel;
pub mod history;
pub mod roster;

pub use channel::{ChannelProvisioner, ChannelSpec};
pub use history::{CommunityStore, HistoryStore};
pub use roster::RosterProvider;
