//! Roster provider trait: who takes part in a round.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ParticipantSet;

/// Resolves the participants of a community.
#[async_trait]
pub trait RosterProvider: Send + Sync {
    /// Provider name (e.g. "local", "discord").
    fn name(&self) -> &str;

    /// Members holding any of `roles`, excluding bots and anyone whose
    /// username or ID appears in `blacklist`.
    async fn participants(&self, roles: &[String], blacklist: &[String]) -> Result<ParticipantSet>;
}
