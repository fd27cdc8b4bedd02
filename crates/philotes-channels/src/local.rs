//! Local guild: a community kept on disk.
//!
//! Layout of a guild directory:
//! ```text
//! <data_dir>/<guild_id>/
//!   ├── roster.toml      members + roles (edited by hand or synced externally)
//!   └── channels.json    channels provisioned by the bot
//! ```

use async_trait::async_trait;
use philotes_core::error::{PhilotesError, Result};
use philotes_core::traits::{ChannelProvisioner, ChannelSpec, RosterProvider};
use philotes_core::types::{Group, ParticipantSet};
use std::path::Path;
use std::sync::Mutex;

use crate::roster::Roster;
use crate::store::{ChannelKind, ChannelStore, LocalChannel};

pub struct LocalGuild {
    guild_id: String,
    roster: Roster,
    store: Option<ChannelStore>,
    channels: Mutex<Vec<LocalChannel>>,
}

impl LocalGuild {
    /// Open the guild stored in `dir`.
    pub fn open(guild_id: &str, dir: &Path) -> Result<Self> {
        let roster = Roster::load(&dir.join("roster.toml"))?;
        let store = ChannelStore::new(dir)?;
        let channels = store.load();
        tracing::debug!(
            "🏠 Guild {} opened: {} members, {} channels",
            guild_id,
            roster.members.len(),
            channels.len()
        );
        Ok(Self {
            guild_id: guild_id.to_string(),
            roster,
            store: Some(store),
            channels: Mutex::new(channels),
        })
    }

    /// Guild that lives only in memory.
    pub fn in_memory(guild_id: &str, roster: Roster) -> Self {
        Self {
            guild_id: guild_id.to_string(),
            roster,
            store: None,
            channels: Mutex::new(Vec::new()),
        }
    }

    pub fn guild_id(&self) -> &str {
        &self.guild_id
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Snapshot of all provisioned channels.
    pub fn channels(&self) -> Result<Vec<LocalChannel>> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<LocalChannel>>> {
        self.channels
            .lock()
            .map_err(|e| PhilotesError::Channel(format!("Lock: {e}")))
    }

    fn persist(&self, channels: &[LocalChannel]) -> Result<()> {
        match &self.store {
            Some(store) => store.save(channels),
            None => Ok(()),
        }
    }

    fn find_category(channels: &[LocalChannel], name: &str) -> Option<String> {
        channels
            .iter()
            .find(|c| c.kind == ChannelKind::Category && c.name == name)
            .map(|c| c.id.clone())
    }
}

#[async_trait]
impl RosterProvider for LocalGuild {
    fn name(&self) -> &str {
        "local"
    }

    async fn participants(&self, roles: &[String], blacklist: &[String]) -> Result<ParticipantSet> {
        let ids = self.roster.eligible(roles, blacklist);
        tracing::debug!("👥 {} eligible members in guild {}", ids.len(), self.guild_id);
        Ok(ids)
    }
}

#[async_trait]
impl ChannelProvisioner for LocalGuild {
    fn name(&self) -> &str {
        "local"
    }

    async fn ensure_category(&self, name: &str) -> Result<String> {
        let mut channels = self.lock()?;
        if let Some(id) = Self::find_category(&channels, name) {
            return Ok(id);
        }
        let category = LocalChannel::new(name, ChannelKind::Category, None, Vec::new());
        let id = category.id.clone();
        channels.push(category);
        self.persist(&channels)?;
        tracing::info!("📁 Category '{}' created", name);
        Ok(id)
    }

    async fn create_bot_channel(&self, category: &str, name: &str) -> Result<String> {
        let category_id = self.ensure_category(category).await?;
        let mut channels = self.lock()?;
        let channel = LocalChannel::new(name, ChannelKind::Text, Some(category_id), Vec::new());
        let id = channel.id.clone();
        channels.push(channel);
        self.persist(&channels)?;
        tracing::info!("💬 Bot channel '{}' created ({})", name, id);
        Ok(id)
    }

    async fn create_match_channels(&self, groups: &[Group], spec: &ChannelSpec) -> Result<Vec<String>> {
        let mut channels = self.lock()?;
        let category_id = Self::find_category(&channels, &spec.category).ok_or_else(|| {
            PhilotesError::NotFound(format!("Matching category '{}' not found in guild", spec.category))
        })?;

        let mut ids = Vec::with_capacity(groups.len());
        for group in groups {
            let mut channel = LocalChannel::new(
                &spec.channel_name,
                ChannelKind::Text,
                Some(category_id.clone()),
                group.members().to_vec(),
            );
            channel.messages.push(spec.intro_message(group));
            ids.push(channel.id.clone());
            channels.push(channel);
        }
        self.persist(&channels)?;
        tracing::info!("📨 Created {} match channels in guild {}", ids.len(), self.guild_id);
        Ok(ids)
    }

    async fn delete_match_channels(&self, channel_name: &str) -> Result<usize> {
        let mut channels = self.lock()?;
        let before = channels.len();
        channels.retain(|c| !(c.kind == ChannelKind::Text && c.name == channel_name));
        let deleted = before - channels.len();
        if deleted > 0 {
            self.persist(&channels)?;
            tracing::info!("🗑️ Deleted {} '{}' channels", deleted, channel_name);
        }
        Ok(deleted)
    }

    async fn post(&self, channel_id: &str, text: &str) -> Result<()> {
        let mut channels = self.lock()?;
        let channel = channels
            .iter_mut()
            .find(|c| c.id == channel_id)
            .ok_or_else(|| PhilotesError::NotFound(format!("channel {channel_id}")))?;
        channel.messages.push(text.to_string());
        self.persist(&channels)?;
        Ok(())
    }
}
