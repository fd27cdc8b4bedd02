//! Per-community configuration record.
//!
//! Everything a round needs to know about a community (status, matching
//! roles, blacklist, weekly schedule) lives here and is passed explicitly to
//! the round runner. The record is mutated only through the update methods
//! below and persisted by the caller through a `CommunityStore`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PhilotesError, Result};

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Whether scheduled rounds run for a community.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommunityStatus {
    Active,
    Paused,
}

impl CommunityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "paused" => Self::Paused,
            _ => Self::Active,
        }
    }
}

impl std::fmt::Display for CommunityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weekly matching time in UTC. `day_of_week` is 0 = Sunday … 6 = Saturday.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchSchedule {
    pub day_of_week: u8,
    pub hour: u8,
    pub minute: u8,
}

impl Default for MatchSchedule {
    fn default() -> Self {
        // Tuesday 11:00 UTC
        Self {
            day_of_week: 2,
            hour: 11,
            minute: 0,
        }
    }
}

impl MatchSchedule {
    /// Build a validated schedule.
    pub fn new(day_of_week: u8, hour: u8, minute: u8) -> Result<Self> {
        let mut schedule = Self::default();
        schedule.set_day_of_week(day_of_week)?;
        schedule.set_hour(hour)?;
        schedule.set_minute(minute)?;
        Ok(schedule)
    }

    pub fn set_day_of_week(&mut self, day: u8) -> Result<()> {
        if day > 6 {
            return Err(PhilotesError::InvalidInput(format!(
                "day of week must be 0-6 (Sunday-Saturday), got {day}"
            )));
        }
        self.day_of_week = day;
        Ok(())
    }

    pub fn set_hour(&mut self, hour: u8) -> Result<()> {
        if hour > 23 {
            return Err(PhilotesError::InvalidInput(format!(
                "hour must be 0-23, got {hour}"
            )));
        }
        self.hour = hour;
        Ok(())
    }

    pub fn set_minute(&mut self, minute: u8) -> Result<()> {
        if minute > 59 {
            return Err(PhilotesError::InvalidInput(format!(
                "minute must be 0-59, got {minute}"
            )));
        }
        self.minute = minute;
        Ok(())
    }

    /// 5-field cron expression (`MIN HOUR DOM MON DOW`) for this schedule.
    pub fn cron_expression(&self) -> String {
        format!("{} {} * * {}", self.minute, self.hour, self.day_of_week)
    }

    pub fn day_name(&self) -> &'static str {
        DAY_NAMES[usize::from(self.day_of_week.min(6))]
    }

    /// Days between two consecutive rounds.
    pub fn interval_days(&self) -> u32 {
        7
    }
}

impl std::fmt::Display for MatchSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}'s @ {}:{:02} UTC",
            self.day_name(),
            self.hour,
            self.minute
        )
    }
}

/// Configuration record for one community (a Discord guild, a Slack
/// workspace, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommunityConfig {
    pub guild_id: String,
    pub status: CommunityStatus,
    /// Members holding any of these roles take part in rounds.
    pub roles: Vec<String>,
    /// Usernames or IDs excluded from rounds.
    pub blacklist: Vec<String>,
    pub schedule: MatchSchedule,
    /// Channel the bot listens to for commands.
    pub bot_channel_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommunityConfig {
    pub fn new(guild_id: &str, schedule: MatchSchedule) -> Self {
        let now = Utc::now();
        Self {
            guild_id: guild_id.to_string(),
            status: CommunityStatus::Active,
            roles: Vec::new(),
            blacklist: Vec::new(),
            schedule,
            bot_channel_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CommunityStatus::Active
    }

    pub fn set_roles(&mut self, roles: Vec<String>) -> Result<()> {
        if roles.is_empty() {
            return Err(PhilotesError::InvalidInput(
                "at least one role is required".into(),
            ));
        }
        self.roles = roles;
        self.touch();
        Ok(())
    }

    pub fn set_blacklist(&mut self, blacklist: Vec<String>) -> Result<()> {
        if blacklist.is_empty() {
            return Err(PhilotesError::InvalidInput(
                "at least one user is required".into(),
            ));
        }
        self.blacklist = blacklist;
        self.touch();
        Ok(())
    }

    pub fn pause(&mut self) {
        self.status = CommunityStatus::Paused;
        self.touch();
    }

    pub fn resume(&mut self) {
        self.status = CommunityStatus::Active;
        self.touch();
    }

    pub fn set_day_of_week(&mut self, day: u8) -> Result<()> {
        self.schedule.set_day_of_week(day)?;
        self.touch();
        Ok(())
    }

    pub fn set_hour(&mut self, hour: u8) -> Result<()> {
        self.schedule.set_hour(hour)?;
        self.touch();
        Ok(())
    }

    pub fn set_minute(&mut self, minute: u8) -> Result<()> {
        self.schedule.set_minute(minute)?;
        self.touch();
        Ok(())
    }

    /// Re-enable a community after the bot rejoins it with a fresh channel.
    pub fn reactivate(&mut self, bot_channel_id: &str) {
        self.status = CommunityStatus::Active;
        self.bot_channel_id = Some(bot_channel_id.to_string());
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Split a comma-separated argument list, trimming entries and dropping
/// empty ones: `"Dev, Design,,"` → `["Dev", "Design"]`.
pub fn parse_list(args: &str) -> Vec<String> {
    args.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
