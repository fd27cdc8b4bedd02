//! Round runner: one full matching round for a community.

use std::sync::Arc;

use philotes_core::community::CommunityConfig;
use philotes_core::config::BotConfig;
use philotes_core::error::{PhilotesError, Result};
use philotes_core::traits::{ChannelProvisioner, ChannelSpec, HistoryStore, RosterProvider};
use philotes_core::types::Group;
use philotes_matching::PairingEngine;
use philotes_scheduler::{NotifyPriority, NotifyRouter, NotifyTarget, dispatch_all};
use serde::Serialize;

/// Result of a round.
#[derive(Debug, Clone, Serialize)]
pub struct RoundOutcome {
    pub guild_id: String,
    /// Round number the pairs were recorded under. For a skipped round (or
    /// one that produced no pairs) this is the latest existing round.
    pub round: u32,
    pub groups: Vec<Group>,
    pub channels_created: usize,
}

impl RoundOutcome {
    /// True when nobody was eligible and nothing was touched.
    pub fn skipped(&self) -> bool {
        self.groups.is_empty()
    }

    /// One-line summary for logs and replies.
    pub fn summary(&self) -> String {
        if self.skipped() {
            return "no eligible participants, round skipped".into();
        }
        let groups: Vec<String> = self.groups.iter().map(|g| g.to_string()).collect();
        if self.groups.iter().all(|g| g.pairs().is_empty()) {
            return format!("no pairs recorded: {}", groups.join(" "));
        }
        format!("round {}: {}", self.round, groups.join(" "))
    }
}

/// Runs rounds against one community's collaborators.
pub struct RoundRunner {
    roster: Arc<dyn RosterProvider>,
    history: Arc<dyn HistoryStore>,
    channels: Arc<dyn ChannelProvisioner>,
    bot: BotConfig,
    targets: Vec<(String, NotifyTarget)>,
    engine: PairingEngine,
}

impl RoundRunner {
    pub fn new(
        roster: Arc<dyn RosterProvider>,
        history: Arc<dyn HistoryStore>,
        channels: Arc<dyn ChannelProvisioner>,
        bot: BotConfig,
    ) -> Self {
        Self {
            roster,
            history,
            channels,
            bot,
            targets: Vec::new(),
            engine: PairingEngine::new(),
        }
    }

    /// Announce every round to these targets.
    pub fn with_targets(mut self, targets: Vec<(String, NotifyTarget)>) -> Self {
        self.targets = targets;
        self
    }

    /// Fix the shuffle seed (reproducible rounds).
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.engine = match seed {
            Some(seed) => PairingEngine::with_seed(seed),
            None => PairingEngine::new(),
        };
        self
    }

    pub fn bot(&self) -> &BotConfig {
        &self.bot
    }

    pub fn channel_spec(&self, community: &CommunityConfig) -> ChannelSpec {
        ChannelSpec {
            category: self.bot.category_name.clone(),
            channel_name: self.bot.matching_channel_name.clone(),
            interval_days: community.schedule.interval_days(),
        }
    }

    /// Run one round: participants → history → groups → persist → channels → announce.
    pub async fn run_round(&self, community: &CommunityConfig) -> Result<RoundOutcome> {
        let guild_id = community.guild_id.as_str();
        if community.roles.is_empty() {
            return Err(PhilotesError::InvalidInput(
                "No matches will be made since no roles have been set. Run the command: /setRoles <Role1>, <Role2>, <Role3>,...".into(),
            ));
        }

        let participants = self
            .roster
            .participants(&community.roles, &community.blacklist)
            .await?;
        if participants.is_empty() {
            tracing::info!("⏭️ Guild {}: no eligible participants, round skipped", guild_id);
            return Ok(RoundOutcome {
                guild_id: guild_id.to_string(),
                round: self.history.latest_round(guild_id).await?,
                groups: Vec::new(),
                channels_created: 0,
            });
        }

        let history = self.history.historical_pairs(guild_id, &participants).await?;
        let groups = self.engine.compute(&participants, &history);
        let round = self.history.record_round(guild_id, &groups).await?;
        tracing::info!(
            "🤝 Guild {}: round {} with {} groups for {} participants",
            guild_id,
            round,
            groups.len(),
            participants.len()
        );

        let spec = self.channel_spec(community);
        let deleted = self.channels.delete_match_channels(&spec.channel_name).await?;
        tracing::debug!("🗑️ Guild {}: {} previous match channels deleted", guild_id, deleted);
        self.channels.ensure_category(&spec.category).await?;
        let created = self.channels.create_match_channels(&groups, &spec).await?;

        let outcome = RoundOutcome {
            guild_id: guild_id.to_string(),
            round,
            groups,
            channels_created: created.len(),
        };
        self.announce(&outcome).await;
        Ok(outcome)
    }

    /// Delete the current match channels.
    pub async fn delete_channels(&self) -> Result<usize> {
        self.channels
            .delete_match_channels(&self.bot.matching_channel_name)
            .await
    }

    async fn announce(&self, outcome: &RoundOutcome) {
        if self.targets.is_empty() {
            return;
        }
        let notification = NotifyRouter::create(
            &format!("New matches for guild {}", outcome.guild_id),
            &outcome.summary(),
            "round",
            NotifyPriority::Normal,
        );
        for (name, result) in dispatch_all(&notification, &self.targets).await {
            if let Err(e) = result {
                tracing::warn!("⚠️ Round announcement via {} failed: {}", name, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use philotes_channels::{LocalGuild, Member, Roster};
    use philotes_core::community::MatchSchedule;
    use philotes_core::types::ParticipantSet;
    use philotes_memory::InMemoryStore;

    fn roster(ids: &[&str]) -> Roster {
        Roster {
            members: ids
                .iter()
                .map(|id| Member {
                    id: id.to_string(),
                    username: format!("user{id}"),
                    roles: vec!["Dev".into()],
                    bot: false,
                })
                .collect(),
        }
    }

    fn community() -> CommunityConfig {
        let mut c = CommunityConfig::new("g", MatchSchedule::default());
        c.set_roles(vec!["Dev".into()]).unwrap();
        c
    }

    fn runner(guild: Arc<LocalGuild>, store: Arc<InMemoryStore>) -> RoundRunner {
        RoundRunner::new(guild.clone(), store, guild, BotConfig::default()).with_seed(Some(7))
    }

    #[tokio::test]
    async fn test_round_without_roles_is_refused() {
        let guild = Arc::new(LocalGuild::in_memory("g", roster(&["1", "2"])));
        let store = Arc::new(InMemoryStore::new());
        let c = CommunityConfig::new("g", MatchSchedule::default());
        let err = runner(guild, store.clone()).run_round(&c).await;
        assert!(matches!(err, Err(PhilotesError::InvalidInput(_))));
        assert_eq!(store.latest_round("g").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_roster_skips_round() {
        let guild = Arc::new(LocalGuild::in_memory("g", roster(&[])));
        let store = Arc::new(InMemoryStore::new());
        let outcome = runner(guild.clone(), store.clone())
            .run_round(&community())
            .await
            .unwrap();
        assert!(outcome.skipped());
        assert_eq!(outcome.round, 0);
        assert!(guild.channels().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single_member_round_records_no_pairs() {
        let guild = Arc::new(LocalGuild::in_memory("g", roster(&["1"])));
        let store = Arc::new(InMemoryStore::new());
        let outcome = runner(guild, store.clone())
            .run_round(&community())
            .await
            .unwrap();
        assert!(!outcome.skipped());
        assert_eq!(outcome.round, 0);
        assert_eq!(outcome.summary(), "no pairs recorded: [1]");
        assert_eq!(store.latest_round("g").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_full_round() {
        let guild = Arc::new(LocalGuild::in_memory("g", roster(&["1", "2", "3", "4", "5"])));
        let store = Arc::new(InMemoryStore::new());
        let runner = runner(guild.clone(), store.clone());

        let outcome = runner.run_round(&community()).await.unwrap();
        assert_eq!(outcome.round, 1);
        assert_eq!(outcome.groups.len(), 2);
        assert_eq!(outcome.channels_created, 2);
        // 2 + 3 members → 1 + 3 pairs
        assert_eq!(store.round_pairs("g", 1).unwrap().len(), 4);

        let matches = guild
            .channels()
            .unwrap()
            .into_iter()
            .filter(|c| c.name == "matches")
            .count();
        assert_eq!(matches, 2);
    }

    #[tokio::test]
    async fn test_next_round_replaces_channels() {
        let guild = Arc::new(LocalGuild::in_memory("g", roster(&["1", "2", "3", "4"])));
        let store = Arc::new(InMemoryStore::new());
        let runner = runner(guild.clone(), store.clone());

        runner.run_round(&community()).await.unwrap();
        let second = runner.run_round(&community()).await.unwrap();
        assert_eq!(second.round, 2);

        let matches = guild
            .channels()
            .unwrap()
            .into_iter()
            .filter(|c| c.name == "matches")
            .count();
        assert_eq!(matches, 2);
        assert_eq!(runner.delete_channels().await.unwrap(), 2);
    }

    struct FailingRoster;

    #[async_trait]
    impl RosterProvider for FailingRoster {
        fn name(&self) -> &str {
            "failing"
        }

        async fn participants(&self, _: &[String], _: &[String]) -> Result<ParticipantSet> {
            Err(PhilotesError::Roster("guild unavailable".into()))
        }
    }

    #[tokio::test]
    async fn test_roster_failure_aborts_before_persisting() {
        let guild = Arc::new(LocalGuild::in_memory("g", roster(&[])));
        let store = Arc::new(InMemoryStore::new());
        let runner = RoundRunner::new(Arc::new(FailingRoster), store.clone(), guild, BotConfig::default());
        assert!(runner.run_round(&community()).await.is_err());
        assert_eq!(store.latest_round("g").await.unwrap(), 0);
    }
}
