//! # Philotes Bot
//! Everything that happens in a community around the pairing engine:
//! running a round end to end, answering chat commands and onboarding a
//! new community.
//!
//! ## Round stages
//! ```text
//! roster ──► history ──► PairingEngine ──► record_round ──► channels ──► announce
//! (abort)   (abort)                        (abort)          (abort)     (warn only)
//! ```

pub mod commands;
pub mod onboarding;
pub mod round;

pub use commands::{Command, CommandHandler, IncomingMessage};
pub use onboarding::{Onboarder, OnboardingOutcome};
pub use round::{RoundOutcome, RoundRunner};
