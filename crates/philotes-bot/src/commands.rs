//! Chat commands sent to the bot channel of a community.
//!
//! `<prefix><command> <args>`, e.g. `/setRoles Dev, Design`. Messages from
//! bots, messages outside the bot channel and messages without the prefix
//! are ignored.

use std::sync::Arc;

use chrono::Utc;
use philotes_core::community::{CommunityConfig, parse_list};
use philotes_core::error::{PhilotesError, Result};
use philotes_core::traits::CommunityStore;
use philotes_scheduler::cron;

use crate::round::RoundRunner;

/// A chat message as seen by the command handler.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub guild_id: String,
    pub channel_id: String,
    pub author_is_bot: bool,
    pub content: String,
}

/// A parsed bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Alive,
    Help,
    Status,
    SetRoles(Vec<String>),
    SetBlacklist(Vec<String>),
    Pause,
    Resume,
    SetDayOfWeek(String),
    SetHour(String),
    SetMinute(String),
    NextDate,
    DeleteChannels,
    MatchOnce,
    Unknown(String),
}

impl Command {
    /// Parse `content`. `None` if it doesn't start with `prefix` or names no command.
    pub fn parse(prefix: &str, content: &str) -> Option<Self> {
        let rest = content.strip_prefix(prefix)?;
        let mut words = rest.split_whitespace();
        let name = words.next()?;
        let args = words.collect::<Vec<_>>().join(" ");

        Some(match name {
            "alive" => Self::Alive,
            "help" => Self::Help,
            "status" => Self::Status,
            "setRoles" => Self::SetRoles(parse_list(&args)),
            "setBlacklist" => Self::SetBlacklist(parse_list(&args)),
            "pause" => Self::Pause,
            "resume" | "start" => Self::Resume,
            "setDayOfWeek" => Self::SetDayOfWeek(args),
            "setHour" => Self::SetHour(args),
            "setMinute" => Self::SetMinute(args),
            "nextDate" => Self::NextDate,
            "deleteChannels" => Self::DeleteChannels,
            "matchOnce" => Self::MatchOnce,
            other => Self::Unknown(other.to_string()),
        })
    }
}

/// Executes commands against the community store and the round runner.
pub struct CommandHandler {
    store: Arc<dyn CommunityStore>,
    runner: RoundRunner,
    prefix: String,
}

impl CommandHandler {
    pub fn new(store: Arc<dyn CommunityStore>, runner: RoundRunner, prefix: &str) -> Self {
        Self {
            store,
            runner,
            prefix: prefix.to_string(),
        }
    }

    /// Handle one message. Returns the replies to post, empty when the
    /// message is ignored. Invalid arguments become a reply, not an error.
    pub async fn handle(&self, message: &IncomingMessage) -> Result<Vec<String>> {
        if message.author_is_bot {
            return Ok(Vec::new());
        }
        let Some(command) = Command::parse(&self.prefix, &message.content) else {
            return Ok(Vec::new());
        };

        let community = self
            .store
            .load_community(&message.guild_id)
            .await?
            .ok_or_else(|| {
                PhilotesError::NotFound(format!("guild {} is not onboarded", message.guild_id))
            })?;
        if community.bot_channel_id.as_deref() != Some(message.channel_id.as_str()) {
            return Ok(Vec::new());
        }
        tracing::debug!("⌨️ Guild {}: {:?}", community.guild_id, command);

        match self.execute(community, command).await {
            Err(PhilotesError::InvalidInput(reply)) => Ok(vec![reply]),
            other => other,
        }
    }

    async fn execute(&self, mut community: CommunityConfig, command: Command) -> Result<Vec<String>> {
        let p = &self.prefix;
        match command {
            Command::Alive => Ok(vec!["Alive".into()]),
            Command::Help => Ok(self.help()),
            Command::Status => Ok(vec![
                format!("Status: {}", community.status),
                format!("Roles: {}", serde_json::to_string(&community.roles)?),
                format!("Blacklist: {}", serde_json::to_string(&community.blacklist)?),
                format!("Matching time: {}", community.schedule),
            ]),
            Command::SetRoles(roles) => {
                if roles.is_empty() {
                    return Err(PhilotesError::InvalidInput(format!(
                        "Please provide at least one role as an argument: {p}setRoles <Role1>, <Role2>"
                    )));
                }
                community.set_roles(roles)?;
                self.store.save_community(&community).await?;
                Ok(vec![format!("New Roles: {}", community.roles.join(", "))])
            }
            Command::SetBlacklist(users) => {
                if users.is_empty() {
                    return Err(PhilotesError::InvalidInput(format!(
                        "Please provide at least one user as an argument: {p}setBlacklist <user>"
                    )));
                }
                let old = serde_json::to_string(&community.blacklist)?;
                community.set_blacklist(users)?;
                self.store.save_community(&community).await?;
                Ok(vec![
                    format!("Old Blacklist: {old}"),
                    format!("New Blacklist: {}", community.blacklist.join(", ")),
                ])
            }
            Command::Pause => {
                community.pause();
                self.store.save_community(&community).await?;
                Ok(vec![format!("Matching paused ⏸️ Resume with {p}resume")])
            }
            Command::Resume => {
                community.resume();
                self.store.save_community(&community).await?;
                Ok(vec![format!("Matching resumed ▶️ {}", community.schedule)])
            }
            Command::SetDayOfWeek(arg) => {
                community.set_day_of_week(parse_number(&arg, &format!("{p}setDayOfWeek <day of week 0-6>"))?)?;
                self.save_schedule(&community).await
            }
            Command::SetHour(arg) => {
                community.set_hour(parse_number(&arg, &format!("{p}setHour <hour 0-23>"))?)?;
                self.save_schedule(&community).await
            }
            Command::SetMinute(arg) => {
                community.set_minute(parse_number(&arg, &format!("{p}setMinute <minute 0-59>"))?)?;
                self.save_schedule(&community).await
            }
            Command::NextDate => Ok(vec![next_date(&community)]),
            Command::DeleteChannels => {
                self.runner.delete_channels().await?;
                Ok(vec!["Channels deleted.".into()])
            }
            Command::MatchOnce => {
                let outcome = self.runner.run_round(&community).await?;
                if outcome.skipped() {
                    return Ok(vec!["No members with the matching roles, no matches were made.".into()]);
                }
                Ok(vec![
                    "Deleted previous matched channels! ✅".into(),
                    "New matches created! ✅".into(),
                    "---⚡🦎---".into(),
                ])
            }
            Command::Unknown(name) => Ok(vec![format!("Command \"{name}\" does not exist")]),
        }
    }

    async fn save_schedule(&self, community: &CommunityConfig) -> Result<Vec<String>> {
        self.store.save_community(community).await?;
        Ok(vec![format!("New matching time: {}", community.schedule)])
    }

    fn help(&self) -> Vec<String> {
        let p = &self.prefix;
        vec![
            "Available commands:".into(),
            format!("{p}setRoles <Role1>, <Role2>, ... => members of which roles should be included in the matching process"),
            format!("{p}setBlacklist <user1>, <user2>, ... => members who should never be matched"),
            format!("{p}status => get current status of the bot"),
            format!("{p}pause => pause bot"),
            format!("{p}resume or {p}start => resume or start bot"),
            format!("{p}matchOnce => deletes previous matches and creates new matches"),
            format!(
                "{p}deleteChannels => deletes all match channels under {} except the channel to communicate with the bot",
                self.runner.bot().category_name
            ),
            format!("{p}setDayOfWeek <day of week 0-6> => what day of the week (Sunday-Saturday) the matching process should be triggered"),
            format!("{p}setHour <hour 0-23> => what hour (0-23) the matching process should be triggered"),
            format!("{p}setMinute <minute 0-59> => what minute (0-59) the matching process should be triggered"),
            format!("{p}nextDate => when the next matching round happens"),
        ]
    }
}

fn parse_number(arg: &str, usage: &str) -> Result<u8> {
    arg.trim()
        .parse()
        .map_err(|_| PhilotesError::InvalidInput(format!("Please provide a number: {usage}")))
}

fn next_date(community: &CommunityConfig) -> String {
    if !community.is_active() {
        return "Matching is paused, no round is scheduled.".into();
    }
    match cron::next_run_from_cron(&community.schedule.cron_expression(), Utc::now()) {
        Some(next) => format!("Next matching date: {}", next.format("%A, %Y-%m-%d %H:%M UTC")),
        None => "No upcoming matching date.".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use philotes_channels::{LocalGuild, Roster};
    use philotes_core::community::{CommunityStatus, MatchSchedule};
    use philotes_core::config::BotConfig;
    use philotes_memory::InMemoryStore;

    #[test]
    fn test_parse() {
        assert_eq!(Command::parse("/", "/alive"), Some(Command::Alive));
        assert_eq!(Command::parse("/", "/start"), Some(Command::Resume));
        assert_eq!(
            Command::parse("/", "/setRoles  Dev,  Design ,"),
            Some(Command::SetRoles(vec!["Dev".into(), "Design".into()]))
        );
        assert_eq!(Command::parse("/", "/setHour 9"), Some(Command::SetHour("9".into())));
        assert_eq!(Command::parse("/", "/dance"), Some(Command::Unknown("dance".into())));
        assert_eq!(Command::parse("/", "alive"), None);
        assert_eq!(Command::parse("/", "/"), None);
        assert_eq!(Command::parse("!", "!status"), Some(Command::Status));
    }

    struct Fixture {
        store: Arc<InMemoryStore>,
        handler: CommandHandler,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let mut community = CommunityConfig::new("g", MatchSchedule::default());
        community.bot_channel_id = Some("bot".into());
        store.save_community(&community).await.unwrap();

        let guild = Arc::new(LocalGuild::in_memory("g", Roster::default()));
        let runner = RoundRunner::new(guild.clone(), store.clone(), guild, BotConfig::default());
        let handler = CommandHandler::new(store.clone(), runner, "/");
        Fixture { store, handler }
    }

    fn message(content: &str) -> IncomingMessage {
        IncomingMessage {
            guild_id: "g".into(),
            channel_id: "bot".into(),
            author_is_bot: false,
            content: content.into(),
        }
    }

    async fn stored(store: &InMemoryStore) -> CommunityConfig {
        store.load_community("g").await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_ignored_messages() {
        let f = fixture().await;
        let mut from_bot = message("/alive");
        from_bot.author_is_bot = true;
        assert!(f.handler.handle(&from_bot).await.unwrap().is_empty());

        let mut elsewhere = message("/alive");
        elsewhere.channel_id = "general".into();
        assert!(f.handler.handle(&elsewhere).await.unwrap().is_empty());

        assert!(f.handler.handle(&message("hello")).await.unwrap().is_empty());
        assert_eq!(f.handler.handle(&message("/alive")).await.unwrap(), vec!["Alive"]);
    }

    #[tokio::test]
    async fn test_unknown_guild() {
        let f = fixture().await;
        let mut msg = message("/alive");
        msg.guild_id = "other".into();
        assert!(matches!(f.handler.handle(&msg).await, Err(PhilotesError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_guild_ignores_chatter() {
        let f = fixture().await;
        let mut from_bot = message("/alive");
        from_bot.guild_id = "other".into();
        from_bot.author_is_bot = true;
        assert!(f.handler.handle(&from_bot).await.unwrap().is_empty());

        let mut plain = message("hello");
        plain.guild_id = "other".into();
        assert!(f.handler.handle(&plain).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let f = fixture().await;
        let replies = f.handler.handle(&message("/dance")).await.unwrap();
        assert_eq!(replies, vec!["Command \"dance\" does not exist"]);
    }

    #[tokio::test]
    async fn test_set_roles_and_blacklist() {
        let f = fixture().await;
        let replies = f.handler.handle(&message("/setRoles Dev, Design")).await.unwrap();
        assert_eq!(replies, vec!["New Roles: Dev, Design"]);

        let replies = f.handler.handle(&message("/setBlacklist ada")).await.unwrap();
        assert_eq!(replies, vec!["Old Blacklist: []", "New Blacklist: ada"]);

        let c = stored(&f.store).await;
        assert_eq!(c.roles, vec!["Dev", "Design"]);
        assert_eq!(c.blacklist, vec!["ada"]);

        let replies = f.handler.handle(&message("/setRoles , ,")).await.unwrap();
        assert!(replies[0].starts_with("Please provide at least one role"));
        assert_eq!(stored(&f.store).await.roles, vec!["Dev", "Design"]);
    }

    #[tokio::test]
    async fn test_schedule_commands() {
        let f = fixture().await;
        let replies = f.handler.handle(&message("/setDayOfWeek 5")).await.unwrap();
        assert_eq!(replies, vec!["New matching time: Friday's @ 11:00 UTC"]);
        f.handler.handle(&message("/setMinute 7")).await.unwrap();

        let replies = f.handler.handle(&message("/setHour 24")).await.unwrap();
        assert!(replies[0].contains("0-23"));
        let replies = f.handler.handle(&message("/setHour soon")).await.unwrap();
        assert!(replies[0].starts_with("Please provide a number"));

        let c = stored(&f.store).await;
        assert_eq!(c.schedule, MatchSchedule::new(5, 11, 7).unwrap());

        let replies = f.handler.handle(&message("/nextDate")).await.unwrap();
        assert!(replies[0].starts_with("Next matching date: Friday"));
    }

    #[tokio::test]
    async fn test_pause_and_resume() {
        let f = fixture().await;
        f.handler.handle(&message("/pause")).await.unwrap();
        assert_eq!(stored(&f.store).await.status, CommunityStatus::Paused);
        let replies = f.handler.handle(&message("/nextDate")).await.unwrap();
        assert!(replies[0].contains("paused"));

        f.handler.handle(&message("/start")).await.unwrap();
        assert_eq!(stored(&f.store).await.status, CommunityStatus::Active);

        let status = f.handler.handle(&message("/status")).await.unwrap();
        assert_eq!(status[0], "Status: active");
        assert_eq!(status[3], "Matching time: Tuesday's @ 11:00 UTC");
    }

    #[tokio::test]
    async fn test_match_once_without_roles() {
        let f = fixture().await;
        let replies = f.handler.handle(&message("/matchOnce")).await.unwrap();
        assert!(replies[0].starts_with("No matches will be made"));
    }
}
