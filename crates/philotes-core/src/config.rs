//! Philotes configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::community::MatchSchedule;
use crate::error::{PhilotesError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhilotesConfig {
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub guild: GuildConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

fn default_command_prefix() -> String { "/".into() }

impl Default for PhilotesConfig {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
            bot: BotConfig::default(),
            storage: StorageConfig::default(),
            guild: GuildConfig::default(),
            scheduler: SchedulerConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

impl PhilotesConfig {
    /// Load config from the default path (~/.philotes/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default().with_env_overrides())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PhilotesError::Config(format!("Failed to read config: {e}")))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!("⚙️ Config loaded from {}", path.display());
        Ok(config.with_env_overrides())
    }

    /// Parse config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| PhilotesError::Config(format!("Failed to parse config: {e}")))
    }

    /// Save config to the given path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| PhilotesError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Philotes home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".philotes")
    }

    /// Schedule given to newly onboarded communities.
    pub fn default_schedule(&self) -> Result<MatchSchedule> {
        MatchSchedule::new(
            self.scheduler.day_of_week,
            self.scheduler.hour,
            self.scheduler.minute,
        )
    }

    fn with_env_overrides(mut self) -> Self {
        match std::env::var("PHILOTES_DISCORD_WEBHOOK_URL") {
            Ok(url) if !url.is_empty() => self.notify.discord_webhook_url = Some(url),
            _ => {}
        }
        self
    }
}

/// Names the bot uses for the channels it manages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_category_name")]
    pub category_name: String,
    #[serde(default = "default_communication_channel_name")]
    pub communication_channel_name: String,
    #[serde(default = "default_matching_channel_name")]
    pub matching_channel_name: String,
}

fn default_category_name() -> String { "Matching-Bot-Philotes".into() }
fn default_communication_channel_name() -> String { "Matching-Bot-Communication".into() }
fn default_matching_channel_name() -> String { "matches".into() }

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            category_name: default_category_name(),
            communication_channel_name: default_communication_channel_name(),
            matching_channel_name: default_matching_channel_name(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String { "~/.philotes/philotes.db".into() }

impl Default for StorageConfig {
    fn default() -> Self {
        Self { db_path: default_db_path() }
    }
}

impl StorageConfig {
    pub fn db_path(&self) -> PathBuf {
        expand_path(&self.db_path)
    }
}

/// Local guild data (roster file + provisioned channels).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildConfig {
    #[serde(default = "default_guild_data_dir")]
    pub data_dir: String,
}

fn default_guild_data_dir() -> String { "~/.philotes/guilds".into() }

impl Default for GuildConfig {
    fn default() -> Self {
        Self { data_dir: default_guild_data_dir() }
    }
}

impl GuildConfig {
    /// Data directory for one guild: `<data_dir>/<guild_id>`.
    pub fn guild_dir(&self, guild_id: &str) -> PathBuf {
        expand_path(&self.data_dir).join(guild_id)
    }
}

/// Scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,
    #[serde(default = "default_day_of_week")]
    pub day_of_week: u8,
    #[serde(default = "default_hour")]
    pub hour: u8,
    #[serde(default)]
    pub minute: u8,
}

fn default_check_interval() -> u64 { 30 }
fn default_day_of_week() -> u8 { 2 }
fn default_hour() -> u8 { 11 }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval(),
            day_of_week: default_day_of_week(),
            hour: default_hour(),
            minute: 0,
        }
    }
}

/// Round announcement targets.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotifyConfig {
    #[serde(default)]
    pub discord_webhook_url: Option<String>,
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Expand `~` in a configured path.
pub fn expand_path(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(p).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = PhilotesConfig::from_toml("").unwrap();
        assert_eq!(config.command_prefix, "/");
        assert_eq!(config.bot.matching_channel_name, "matches");
        assert_eq!(config.scheduler.check_interval_secs, 30);
        assert_eq!(
            config.default_schedule().unwrap(),
            MatchSchedule::default()
        );
    }

    #[test]
    fn test_partial_toml() {
        let config = PhilotesConfig::from_toml(
            r#"
command_prefix = "!"

[scheduler]
day_of_week = 5
hour = 9

[notify]
discord_webhook_url = "https://discord.example/webhook"
"#,
        )
        .unwrap();
        assert_eq!(config.command_prefix, "!");
        let schedule = config.default_schedule().unwrap();
        assert_eq!(schedule.cron_expression(), "0 9 * * 5");
        assert_eq!(
            config.notify.discord_webhook_url.as_deref(),
            Some("https://discord.example/webhook")
        );
        assert_eq!(config.bot.category_name, "Matching-Bot-Philotes");
    }

    #[test]
    fn test_invalid_default_schedule_is_rejected() {
        let config = PhilotesConfig::from_toml("[scheduler]\nhour = 42\n").unwrap();
        assert!(config.default_schedule().is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = std::env::temp_dir().join(format!("philotes-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");
        let mut config = PhilotesConfig::default();
        config.bot.matching_channel_name = "coffee".into();
        config.save_to(&path).unwrap();

        let loaded = PhilotesConfig::load_from(&path).unwrap();
        assert_eq!(loaded.bot.matching_channel_name, "coffee");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_guild_dir() {
        let config = GuildConfig { data_dir: "/tmp/philotes".into() };
        assert_eq!(config.guild_dir("42"), PathBuf::from("/tmp/philotes/42"));
    }
}
