//! In-memory store: same semantics as the SQLite store, nothing persisted.

use async_trait::async_trait;
use philotes_core::community::CommunityConfig;
use philotes_core::error::{PhilotesError, Result};
use philotes_core::traits::{CommunityStore, HistoryStore};
use philotes_core::types::{Group, HistoricalPairs, ParticipantSet};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
struct PairRow {
    user1: String,
    user2: String,
    round: u32,
}

#[derive(Default)]
struct Inner {
    matches: HashMap<String, Vec<PairRow>>,
    communities: HashMap<String, CommunityConfig>,
}

/// In-memory history + community store.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| PhilotesError::Storage(format!("Lock: {e}")))
    }

    /// Pairs recorded for one round.
    pub fn round_pairs(&self, guild_id: &str, round: u32) -> Result<Vec<(String, String)>> {
        let inner = self.lock()?;
        Ok(inner
            .matches
            .get(guild_id)
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.round == round)
                    .map(|r| (r.user1.clone(), r.user2.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl HistoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn historical_pairs(
        &self,
        guild_id: &str,
        participants: &ParticipantSet,
    ) -> Result<HistoricalPairs> {
        let inner = self.lock()?;
        let rows = inner.matches.get(guild_id);
        let mut pairs = HistoricalPairs::new();
        for user_id in participants {
            let met = pairs.entry(user_id.clone()).or_default();
            for row in rows.into_iter().flatten() {
                if &row.user1 == user_id {
                    met.insert(row.user2.clone());
                } else if &row.user2 == user_id {
                    met.insert(row.user1.clone());
                }
            }
        }
        Ok(pairs)
    }

    async fn latest_round(&self, guild_id: &str) -> Result<u32> {
        let inner = self.lock()?;
        Ok(inner
            .matches
            .get(guild_id)
            .and_then(|rows| rows.iter().map(|r| r.round).max())
            .unwrap_or(0))
    }

    async fn record_round(&self, guild_id: &str, groups: &[Group]) -> Result<u32> {
        let mut inner = self.lock()?;
        let rows = inner.matches.entry(guild_id.to_string()).or_default();
        let latest = rows.iter().map(|r| r.round).max().unwrap_or(0);
        let new_rows: Vec<PairRow> = groups
            .iter()
            .flat_map(Group::pairs)
            .map(|(a, b)| PairRow {
                user1: a.clone(),
                user2: b.clone(),
                round: latest + 1,
            })
            .collect();
        if new_rows.is_empty() {
            return Ok(latest);
        }
        rows.extend(new_rows);
        Ok(latest + 1)
    }
}

#[async_trait]
impl CommunityStore for InMemoryStore {
    async fn load_community(&self, guild_id: &str) -> Result<Option<CommunityConfig>> {
        Ok(self.lock()?.communities.get(guild_id).cloned())
    }

    async fn save_community(&self, community: &CommunityConfig) -> Result<()> {
        self.lock()?
            .communities
            .insert(community.guild_id.clone(), community.clone());
        Ok(())
    }

    async fn list_communities(&self) -> Result<Vec<CommunityConfig>> {
        let mut all: Vec<_> = self.lock()?.communities.values().cloned().collect();
        all.sort_by(|a, b| a.guild_id.cmp(&b.guild_id));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trio_records_three_pairs() {
        let store = InMemoryStore::new();
        let trio = Group::new(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(store.record_round("g", &[trio]).await.unwrap(), 1);
        assert_eq!(store.round_pairs("g", 1).unwrap().len(), 3);

        let participants: ParticipantSet = ["c".to_string()].into_iter().collect();
        let pairs = store.historical_pairs("g", &participants).await.unwrap();
        assert_eq!(pairs["c"].len(), 2);
    }

    #[tokio::test]
    async fn test_missing_guild_has_empty_history() {
        let store = InMemoryStore::new();
        let participants: ParticipantSet = ["x".to_string()].into_iter().collect();
        let pairs = store.historical_pairs("nope", &participants).await.unwrap();
        assert!(pairs["x"].is_empty());
        assert_eq!(store.latest_round("nope").await.unwrap(), 0);
    }
}
