//! # Philotes Core
//! Shared types, configuration, the workspace error type and the traits
//! implemented by external collaborators (roster, history, channels).

pub mod community;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use community::{CommunityConfig, CommunityStatus, MatchSchedule};
pub use config::PhilotesConfig;
pub use error::{PhilotesError, Result};
pub use types::{Group, HistoricalPairs, ParticipantId, ParticipantSet};
