//! Channel provisioning trait: private spaces for matched groups.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Group;

/// Where and how match channels are created.
#[derive(Debug, Clone)]
pub struct ChannelSpec {
    /// Category the channels are placed under.
    pub category: String,
    /// Name shared by every match channel; also used to find them for deletion.
    pub channel_name: String,
    /// Days until the channels are replaced by the next round.
    pub interval_days: u32,
}

impl ChannelSpec {
    /// Greeting posted in a freshly created match channel.
    pub fn intro_message(&self, group: &Group) -> String {
        let mentions = group
            .members()
            .iter()
            .map(|id| format!("<@{id}>"))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "Hey {mentions} 👋,\nYou have been matched!\nSchedule a call, go for a walk or do whatever else.\nThe channel will automatically be closed after {} days.",
            self.interval_days
        )
    }
}

/// Creates and tears down communication channels.
#[async_trait]
pub trait ChannelProvisioner: Send + Sync {
    fn name(&self) -> &str;

    /// Return the ID of the category `name`, creating it if missing.
    async fn ensure_category(&self, name: &str) -> Result<String>;

    /// Create the channel the bot listens to for commands. Returns its ID.
    async fn create_bot_channel(&self, category: &str, name: &str) -> Result<String>;

    /// Create one private channel per group, visible to its members only.
    /// Returns the IDs of the created channels in group order.
    async fn create_match_channels(&self, groups: &[Group], spec: &ChannelSpec) -> Result<Vec<String>>;

    /// Delete every channel named `channel_name`. Returns how many were deleted.
    async fn delete_match_channels(&self, channel_name: &str) -> Result<usize>;

    /// Post a message to a channel.
    async fn post(&self, channel_id: &str, text: &str) -> Result<()>;
}
