//! Match jobs: one weekly job per active community.

use chrono::{DateTime, Utc};
use philotes_core::community::MatchSchedule;
use serde::{Deserialize, Serialize};

use crate::cron;

/// A scheduled matching round for one community.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchJob {
    pub guild_id: String,
    pub schedule: MatchSchedule,
    pub created_at: DateTime<Utc>,
    /// Last time the job fired.
    pub last_run: Option<DateTime<Utc>>,
    /// Next firing time. `None` if the schedule never matches.
    pub next_run: Option<DateTime<Utc>>,
    pub run_count: u32,
}

impl MatchJob {
    pub fn new(guild_id: &str, schedule: MatchSchedule, now: DateTime<Utc>) -> Self {
        Self {
            guild_id: guild_id.to_string(),
            schedule,
            created_at: now,
            last_run: None,
            next_run: cron::next_run_from_cron(&schedule.cron_expression(), now),
            run_count: 0,
        }
    }

    /// Cron expression the job runs on.
    pub fn expression(&self) -> String {
        self.schedule.cron_expression()
    }

    pub fn should_run(&self, now: DateTime<Utc>) -> bool {
        self.next_run.is_some_and(|next| now >= next)
    }

    /// Swap in a new schedule and recompute `next_run`.
    pub fn reschedule(&mut self, schedule: MatchSchedule, now: DateTime<Utc>) {
        self.schedule = schedule;
        self.next_run = cron::next_run_from_cron(&self.expression(), now);
    }

    /// Record a firing at `now` and advance to the following week.
    pub fn mark_run(&mut self, now: DateTime<Utc>) {
        self.last_run = Some(now);
        self.run_count += 1;
        self.next_run = cron::next_run_from_cron(&self.expression(), now);
    }
}
