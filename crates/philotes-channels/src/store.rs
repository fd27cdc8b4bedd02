//! File-based channel store.
//! Provisioned channels are saved as `channels.json` in the guild directory,
//! rewritten on every create/delete.

use chrono::{DateTime, Utc};
use philotes_core::error::{PhilotesError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Kind of a provisioned channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Category,
    Text,
}

/// A channel created by the bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalChannel {
    pub id: String,
    pub name: String,
    pub kind: ChannelKind,
    /// Parent category ID.
    pub parent: Option<String>,
    /// Members allowed to see the channel. Empty means bot only.
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub messages: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl LocalChannel {
    pub fn new(name: &str, kind: ChannelKind, parent: Option<String>, members: Vec<String>) -> Self {
        Self {
            id: format!("ch-{}", uuid::Uuid::new_v4().simple()),
            name: name.to_string(),
            kind,
            parent,
            members,
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// JSON file store for channels.
pub struct ChannelStore {
    path: PathBuf,
}

impl ChannelStore {
    /// Create a store in the given directory.
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join("channels.json"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save all channels to disk.
    pub fn save(&self, channels: &[LocalChannel]) -> Result<()> {
        let json = serde_json::to_string_pretty(channels)?;
        std::fs::write(&self.path, json)
            .map_err(|e| PhilotesError::Channel(format!("Write error: {e}")))?;
        tracing::debug!("💾 Saved {} channels to {}", channels.len(), self.path.display());
        Ok(())
    }

    /// Load channels from disk. Unreadable files yield an empty list.
    pub fn load(&self) -> Vec<LocalChannel> {
        if !self.path.exists() {
            return Vec::new();
        }
        match std::fs::read_to_string(&self.path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("⚠️ Failed to parse channels.json: {e}");
                Vec::new()
            }),
            Err(e) => {
                tracing::warn!("⚠️ Failed to read channels.json: {e}");
                Vec::new()
            }
        }
    }
}
