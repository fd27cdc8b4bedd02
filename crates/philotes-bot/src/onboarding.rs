//! Onboarding: the bot joins a community (for the first time, or again).

use std::sync::Arc;

use philotes_core::community::{CommunityConfig, MatchSchedule};
use philotes_core::config::{BotConfig, PhilotesConfig};
use philotes_core::error::Result;
use philotes_core::traits::{ChannelProvisioner, CommunityStore};

/// Result of onboarding a community.
#[derive(Debug, Clone)]
pub struct OnboardingOutcome {
    pub community: CommunityConfig,
    pub bot_channel_id: String,
    /// The community had been onboarded before.
    pub returning: bool,
}

pub struct Onboarder {
    store: Arc<dyn CommunityStore>,
    channels: Arc<dyn ChannelProvisioner>,
    bot: BotConfig,
    prefix: String,
    default_schedule: MatchSchedule,
}

impl Onboarder {
    pub fn new(
        store: Arc<dyn CommunityStore>,
        channels: Arc<dyn ChannelProvisioner>,
        config: &PhilotesConfig,
    ) -> Result<Self> {
        Ok(Self {
            store,
            channels,
            bot: config.bot.clone(),
            prefix: config.command_prefix.clone(),
            default_schedule: config.default_schedule()?,
        })
    }

    /// Create the bot channel and register (or reactivate) the community.
    pub async fn onboard(&self, guild_id: &str) -> Result<OnboardingOutcome> {
        let existing = self.store.load_community(guild_id).await?;

        self.channels.ensure_category(&self.bot.category_name).await?;
        let channel_id = self
            .channels
            .create_bot_channel(&self.bot.category_name, &self.bot.communication_channel_name)
            .await?;

        let returning = existing.is_some();
        let community = match existing {
            Some(mut community) => {
                community.reactivate(&channel_id);
                community
            }
            None => {
                let mut community = CommunityConfig::new(guild_id, self.default_schedule);
                community.bot_channel_id = Some(channel_id.clone());
                community
            }
        };
        self.store.save_community(&community).await?;

        if returning {
            self.channels
                .post(
                    &channel_id,
                    "Hey 👋, glad to have you back. Please delete the old bot channel to avoid confusion, it won't work anymore.",
                )
                .await?;
        }
        for line in self.welcome() {
            self.channels.post(&channel_id, &line).await?;
        }

        tracing::info!(
            "👋 Guild {} onboarded ({}), bot channel {}",
            guild_id,
            if returning { "returning" } else { "new" },
            channel_id
        );
        Ok(OnboardingOutcome {
            community,
            bot_channel_id: channel_id,
            returning,
        })
    }

    fn welcome(&self) -> Vec<String> {
        let p = &self.prefix;
        vec![
            "Hey 👋, this is the channel to communicate with the matching bot.".into(),
            format!("As a first step please set a matching role with the command: {p}setRoles <Role>."),
            "All users who have that role will be included in the next matching round.".into(),
            format!("You can always ask for help with {p}help or check the current status with {p}status."),
        ]
    }
}
