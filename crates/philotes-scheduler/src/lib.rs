//! # Philotes Scheduler
//!
//! Fires matching rounds on each community's weekly schedule and announces
//! the results.
//!
//! ## Architecture
//! ```text
//! MatchScheduler (tokio interval)
//!   ├── MatchJob: guild 123 → "0 11 * * 2" (Tuesday's @ 11:00 UTC)
//!   ├── MatchJob: guild 456 → "30 18 * * 5"
//!   └── due → callback(guild_id) → round runner
//!                                     └── NotifyRouter → Dispatch
//!                                           ├── Discord (webhook)
//!                                           └── Webhook (HTTP POST)
//! ```
//!
//! Paused communities have no job. Jobs are rebuilt from the community
//! records with [`MatchScheduler::sync`].

pub mod cron;
pub mod dispatch;
pub mod engine;
pub mod jobs;
pub mod notify;

pub use dispatch::{NotifyTarget, dispatch, dispatch_all, targets_from_config};
pub use engine::{MatchScheduler, spawn_scheduler};
pub use jobs::MatchJob;
pub use notify::{Notification, NotifyPriority, NotifyRouter};
