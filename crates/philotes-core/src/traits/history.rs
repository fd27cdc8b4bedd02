//! Persistence traits: pairing history and community records.

use async_trait::async_trait;

use crate::community::CommunityConfig;
use crate::error::Result;
use crate::types::{Group, HistoricalPairs, ParticipantSet};

/// Pairing history of a community.
///
/// Pairs are stored once per unordered pair and queried from both sides, so
/// `historical_pairs` always returns a symmetric lookup.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Store name (e.g. "sqlite", "memory").
    fn name(&self) -> &str;

    /// Previous partners of every participant. Every participant gets an
    /// entry, possibly empty.
    async fn historical_pairs(
        &self,
        guild_id: &str,
        participants: &ParticipantSet,
    ) -> Result<HistoricalPairs>;

    /// Highest recorded round number, 0 if the community has no history.
    async fn latest_round(&self, guild_id: &str) -> Result<u32>;

    /// Record every pair inside `groups` under round `latest_round + 1` and
    /// return that round number.
    async fn record_round(&self, guild_id: &str, groups: &[Group]) -> Result<u32>;
}

/// Storage of per-community configuration records.
#[async_trait]
pub trait CommunityStore: Send + Sync {
    async fn load_community(&self, guild_id: &str) -> Result<Option<CommunityConfig>>;

    /// Insert or replace the record.
    async fn save_community(&self, community: &CommunityConfig) -> Result<()>;

    async fn list_communities(&self) -> Result<Vec<CommunityConfig>>;
}
