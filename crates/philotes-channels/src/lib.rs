//! # Philotes Channels
//! Community-side collaborators: who is in the roster, and where matched
//! groups get their private channels.
//!
//! `LocalGuild` keeps a community on disk (a TOML roster plus a JSON file of
//! provisioned channels) and implements both `RosterProvider` and
//! `ChannelProvisioner`, so the bot can run end to end without a chat
//! platform connection.

pub mod local;
pub mod roster;
pub mod store;

pub use local::LocalGuild;
pub use roster::{Member, Roster};
pub use store::{ChannelKind, ChannelStore, LocalChannel};
