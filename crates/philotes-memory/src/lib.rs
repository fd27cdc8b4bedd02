//! # Philotes Memory
//! Storage backends for pairing history and community records.
//!
//! History is stored once per unordered pair (`user1_id`, `user2_id`) and
//! queried from both sides, so readers always see a symmetric lookup.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
