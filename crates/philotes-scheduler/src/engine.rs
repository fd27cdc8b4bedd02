//! Scheduler engine: tracks one job per active community and reports the
//! ones that are due. Uses tokio::interval for ticking (sleeps between checks).

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use philotes_core::community::CommunityConfig;
use tokio::sync::Mutex;

use crate::jobs::MatchJob;
use crate::notify::{NotifyPriority, NotifyRouter};

/// Weekly round scheduler.
#[derive(Debug, Default)]
pub struct MatchScheduler {
    jobs: Vec<MatchJob>,
    pub router: NotifyRouter,
}

impl MatchScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild jobs from community records at the current time.
    pub fn sync(&mut self, communities: &[CommunityConfig]) {
        self.sync_at(communities, Utc::now());
    }

    /// Rebuild jobs from community records. Active communities get a job
    /// (rescheduled if their schedule changed). Everything else is dropped.
    pub fn sync_at(&mut self, communities: &[CommunityConfig], now: DateTime<Utc>) {
        let active: Vec<&CommunityConfig> = communities.iter().filter(|c| c.is_active()).collect();

        let before = self.jobs.len();
        self.jobs
            .retain(|job| active.iter().any(|c| c.guild_id == job.guild_id));
        let removed = before - self.jobs.len();

        for community in active {
            match self.jobs.iter_mut().find(|j| j.guild_id == community.guild_id) {
                Some(job) if job.schedule != community.schedule => {
                    job.reschedule(community.schedule, now);
                    tracing::info!(
                        "📅 Rescheduled guild {}: {}",
                        community.guild_id,
                        community.schedule
                    );
                }
                Some(_) => {}
                None => {
                    let job = MatchJob::new(&community.guild_id, community.schedule, now);
                    tracing::info!(
                        "📅 Scheduled guild {}: {} (next {:?})",
                        community.guild_id,
                        community.schedule,
                        job.next_run
                    );
                    self.jobs.push(job);
                }
            }
        }

        if removed > 0 {
            tracing::info!("📅 Removed {} jobs for paused or unknown guilds", removed);
        }
    }

    /// Fire every job due at `now`. Returns the guild IDs whose round should run.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let mut due = Vec::new();
        for job in self.jobs.iter_mut() {
            if !job.should_run(now) {
                continue;
            }
            tracing::info!("🔔 Matching round due for guild {}", job.guild_id);
            job.mark_run(now);
            self.router.record(NotifyRouter::create(
                "Matching round due",
                &format!("guild {} (run #{})", job.guild_id, job.run_count),
                "scheduler",
                NotifyPriority::Normal,
            ));
            due.push(job.guild_id.clone());
        }
        due
    }

    pub fn next_run(&self, guild_id: &str) -> Option<DateTime<Utc>> {
        self.jobs
            .iter()
            .find(|j| j.guild_id == guild_id)
            .and_then(|j| j.next_run)
    }

    pub fn jobs(&self) -> &[MatchJob] {
        &self.jobs
    }
}

/// Spawn the scheduler loop. For every due guild, `on_due` is awaited with the
/// guild ID; failures are logged and the loop keeps going.
///
/// The callback keeps this crate free of a dependency on the round runner.
pub async fn spawn_scheduler<F, Fut>(
    engine: Arc<Mutex<MatchScheduler>>,
    on_due: F,
    check_interval_secs: u64,
) where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = philotes_core::Result<String>> + Send,
{
    tracing::info!(
        "⏰ Scheduler started (check every {}s)",
        check_interval_secs
    );

    let mut interval = tokio::time::interval(std::time::Duration::from_secs(check_interval_secs));

    loop {
        interval.tick().await;

        let due = {
            let mut eng = engine.lock().await;
            eng.tick(Utc::now())
        };

        for guild_id in due {
            match on_due(guild_id.clone()).await {
                Ok(summary) => tracing::info!("✅ Round for guild {}: {}", guild_id, summary),
                Err(e) => tracing::warn!("⚠️ Round failed for guild {}: {}", guild_id, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use philotes_core::community::MatchSchedule;

    fn community(id: &str) -> CommunityConfig {
        CommunityConfig::new(id, MatchSchedule::default())
    }

    fn sunday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 22, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_sync_skips_paused() {
        let mut paused = community("b");
        paused.pause();
        let mut engine = MatchScheduler::new();
        engine.sync_at(&[community("a"), paused], sunday());
        assert_eq!(engine.jobs().len(), 1);
        assert!(engine.next_run("a").is_some());
        assert!(engine.next_run("b").is_none());
    }

    #[test]
    fn test_sync_removes_and_reschedules() {
        let mut engine = MatchScheduler::new();
        engine.sync_at(&[community("a"), community("b")], sunday());

        let mut a = community("a");
        a.set_hour(15).unwrap();
        let mut b = community("b");
        b.pause();
        engine.sync_at(&[a, b], sunday());

        assert_eq!(engine.jobs().len(), 1);
        assert_eq!(
            engine.next_run("a"),
            Some(Utc.with_ymd_and_hms(2026, 2, 24, 15, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_tick_fires_due_jobs_once() {
        let mut engine = MatchScheduler::new();
        engine.sync_at(&[community("a")], sunday());

        assert!(engine.tick(sunday()).is_empty());

        let tuesday = Utc.with_ymd_and_hms(2026, 2, 24, 11, 0, 30).unwrap();
        assert_eq!(engine.tick(tuesday), vec!["a".to_string()]);
        assert!(engine.tick(tuesday).is_empty());
        assert_eq!(engine.jobs()[0].run_count, 1);
        assert_eq!(engine.router.history().len(), 1);
        assert_eq!(
            engine.next_run("a"),
            Some(Utc.with_ymd_and_hms(2026, 3, 3, 11, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_resync_keeps_run_state() {
        let mut engine = MatchScheduler::new();
        engine.sync_at(&[community("a")], sunday());
        let tuesday = Utc.with_ymd_and_hms(2026, 2, 24, 11, 1, 0).unwrap();
        engine.tick(tuesday);
        engine.sync_at(&[community("a")], tuesday);
        assert_eq!(engine.jobs()[0].run_count, 1);
    }
}
