//! # Philotes Matching
//!
//! Pure, synchronous pairing of participants into groups of two (one trio
//! absorbs an odd remainder), steering away from repeat pairings.
//!
//! ```text
//! participants ──► fisher_yates_shuffle ──► pair_in_order ──► Vec<Group>
//!                         ▲                       ▲
//!                    injected Rng          HistoricalPairs
//! ```
//!
//! No I/O, no shared state: concurrent rounds for different communities
//! only need their own random generator.

pub mod engine;
pub mod shuffle;

pub use engine::{PairingEngine, compute_groups, pair_in_order, repeat_pairings};
pub use shuffle::fisher_yates_shuffle;
