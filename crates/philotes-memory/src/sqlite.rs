//! SQLite store for pairing history and community records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use philotes_core::community::{CommunityConfig, CommunityStatus, MatchSchedule};
use philotes_core::error::{PhilotesError, Result};
use philotes_core::traits::{CommunityStore, HistoryStore};
use philotes_core::types::{Group, HistoricalPairs, ParticipantSet};
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::Mutex;

/// SQLite-backed store. One connection, guarded by a mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

fn db_err(e: rusqlite::Error) -> PhilotesError {
    PhilotesError::Storage(e.to_string())
}

fn parse_time(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl SqliteStore {
    /// Open or create the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(db_err)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;").ok();
        let store = Self { conn: Mutex::new(conn) };
        store.migrate()?;
        tracing::debug!("🗄️ History store opened at {}", path.display());
        Ok(store)
    }

    /// In-memory database (tests, dry runs).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        let store = Self { conn: Mutex::new(conn) };
        store.migrate()?;
        Ok(store)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| PhilotesError::Storage(format!("Lock: {e}")))
    }

    /// Create tables.
    fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            -- One row per unordered pair per round
            CREATE TABLE IF NOT EXISTS matches (
                id TEXT PRIMARY KEY,
                guild_id TEXT NOT NULL,
                user1_id TEXT NOT NULL,
                user2_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                matching_round INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_matches_guild_round
                ON matches (guild_id, matching_round);

            -- Per-community configuration record
            CREATE TABLE IF NOT EXISTS communities (
                guild_id TEXT PRIMARY KEY,
                status TEXT NOT NULL DEFAULT 'active',
                roles TEXT NOT NULL DEFAULT '[]',      -- JSON array
                blacklist TEXT NOT NULL DEFAULT '[]',  -- JSON array
                day_of_week INTEGER NOT NULL DEFAULT 2,
                hour INTEGER NOT NULL DEFAULT 11,
                minute INTEGER NOT NULL DEFAULT 0,
                bot_channel_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )
        .map_err(db_err)?;
        Ok(())
    }

    /// Pairs recorded for one round, in insertion order.
    pub fn round_pairs(&self, guild_id: &str, round: u32) -> Result<Vec<(String, String)>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT user1_id, user2_id FROM matches
                 WHERE guild_id = ?1 AND matching_round = ?2 ORDER BY rowid",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![guild_id, round], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(db_err)?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(db_err)
    }

    /// Total number of stored pair rows for a community.
    pub fn pair_count(&self, guild_id: &str) -> Result<usize> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT COUNT(*) FROM matches WHERE guild_id = ?1",
            [guild_id],
            |r| r.get::<_, i64>(0),
        )
        .map(|n| n as usize)
        .map_err(db_err)
    }

    fn latest_round_locked(conn: &Connection, guild_id: &str) -> Result<u32> {
        conn.query_row(
            "SELECT COALESCE(MAX(matching_round), 0) FROM matches WHERE guild_id = ?1",
            [guild_id],
            |r| r.get::<_, u32>(0),
        )
        .map_err(db_err)
    }
}

#[async_trait]
impl HistoryStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn historical_pairs(
        &self,
        guild_id: &str,
        participants: &ParticipantSet,
    ) -> Result<HistoricalPairs> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT user1_id, user2_id FROM matches
                 WHERE guild_id = ?1 AND (user1_id = ?2 OR user2_id = ?2)",
            )
            .map_err(db_err)?;

        let mut pairs = HistoricalPairs::new();
        for user_id in participants {
            let met = pairs.entry(user_id.clone()).or_default();
            let rows = stmt
                .query_map(params![guild_id, user_id], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })
                .map_err(db_err)?;
            for row in rows {
                let (user1, user2) = row.map_err(db_err)?;
                met.insert(if &user1 == user_id { user2 } else { user1 });
            }
        }
        Ok(pairs)
    }

    async fn latest_round(&self, guild_id: &str) -> Result<u32> {
        let conn = self.lock()?;
        Self::latest_round_locked(&conn, guild_id)
    }

    async fn record_round(&self, guild_id: &str, groups: &[Group]) -> Result<u32> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(db_err)?;
        let latest = Self::latest_round_locked(&tx, guild_id)?;

        let pairs: Vec<_> = groups.iter().flat_map(Group::pairs).collect();
        if pairs.is_empty() {
            tracing::debug!("Nothing to record for guild {guild_id}");
            return Ok(latest);
        }

        let round = latest + 1;
        let now = Utc::now().to_rfc3339();
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO matches (id, guild_id, user1_id, user2_id, created_at, matching_round)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .map_err(db_err)?;
            for (user1, user2) in &pairs {
                stmt.execute(params![
                    uuid::Uuid::new_v4().to_string(),
                    guild_id,
                    user1,
                    user2,
                    now,
                    round,
                ])
                .map_err(db_err)?;
            }
        }
        tx.commit().map_err(db_err)?;
        tracing::info!(
            "💾 Recorded {} pairs for guild {} (round {})",
            pairs.len(),
            guild_id,
            round
        );
        Ok(round)
    }
}

#[async_trait]
impl CommunityStore for SqliteStore {
    async fn load_community(&self, guild_id: &str) -> Result<Option<CommunityConfig>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT guild_id, status, roles, blacklist, day_of_week, hour, minute,
                        bot_channel_id, created_at, updated_at
                 FROM communities WHERE guild_id = ?1",
            )
            .map_err(db_err)?;
        let mut rows = stmt.query_map([guild_id], community_from_row).map_err(db_err)?;
        rows.next().transpose().map_err(db_err)
    }

    async fn save_community(&self, community: &CommunityConfig) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO communities
             (guild_id, status, roles, blacklist, day_of_week, hour, minute,
              bot_channel_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                community.guild_id,
                community.status.as_str(),
                serde_json::to_string(&community.roles)?,
                serde_json::to_string(&community.blacklist)?,
                community.schedule.day_of_week,
                community.schedule.hour,
                community.schedule.minute,
                community.bot_channel_id,
                community.created_at.to_rfc3339(),
                community.updated_at.to_rfc3339(),
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    async fn list_communities(&self) -> Result<Vec<CommunityConfig>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT guild_id, status, roles, blacklist, day_of_week, hour, minute,
                        bot_channel_id, created_at, updated_at
                 FROM communities ORDER BY guild_id",
            )
            .map_err(db_err)?;
        let rows = stmt.query_map([], community_from_row).map_err(db_err)?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(db_err)
    }
}

fn community_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CommunityConfig> {
    let status: String = row.get(1)?;
    let roles: String = row.get(2)?;
    let blacklist: String = row.get(3)?;
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;
    Ok(CommunityConfig {
        guild_id: row.get(0)?,
        status: CommunityStatus::parse(&status),
        roles: serde_json::from_str(&roles).unwrap_or_default(),
        blacklist: serde_json::from_str(&blacklist).unwrap_or_default(),
        schedule: MatchSchedule {
            day_of_week: row.get(4)?,
            hour: row.get(5)?,
            minute: row.get(6)?,
        },
        bot_channel_id: row.get(7)?,
        created_at: parse_time(&created_at),
        updated_at: parse_time(&updated_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(ids: &[&str]) -> Group {
        Group::new(ids.iter().map(|s| s.to_string()).collect())
    }

    fn set(ids: &[&str]) -> ParticipantSet {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_open_and_migrate() {
        let dir = std::env::temp_dir().join(format!("philotes-db-{}", uuid::Uuid::new_v4()));
        let store = SqliteStore::open(&dir.join("test.db")).unwrap();
        assert_eq!(store.latest_round("g").await.unwrap(), 0);
        assert!(store.list_communities().await.unwrap().is_empty());
        drop(store);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_history_is_queried_from_both_sides() {
        let store = SqliteStore::open_in_memory().unwrap();
        let round = store
            .record_round("g", &[group(&["a", "b"]), group(&["c", "d", "e"])])
            .await
            .unwrap();
        assert_eq!(round, 1);
        assert_eq!(store.pair_count("g").unwrap(), 4);

        let pairs = store
            .historical_pairs("g", &set(&["a", "b", "e", "z"]))
            .await
            .unwrap();
        assert!(pairs["a"].contains("b"));
        assert!(pairs["b"].contains("a"));
        assert_eq!(pairs["e"].len(), 2);
        assert!(pairs["e"].contains("c") && pairs["e"].contains("d"));
        assert!(pairs["z"].is_empty());
    }

    #[tokio::test]
    async fn test_rounds_increment_per_guild() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.record_round("g1", &[group(&["a", "b"])]).await.unwrap();
        let second = store.record_round("g1", &[group(&["a", "c"])]).await.unwrap();
        assert_eq!(second, 2);
        assert_eq!(store.latest_round("g2").await.unwrap(), 0);
        assert_eq!(
            store.round_pairs("g1", 2).unwrap(),
            vec![("a".to_string(), "c".to_string())]
        );

        // Guilds don't share history.
        let other = store.historical_pairs("g2", &set(&["a"])).await.unwrap();
        assert!(other["a"].is_empty());
    }

    #[tokio::test]
    async fn test_round_without_pairs_is_not_recorded() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.record_round("g", &[group(&["solo"])]).await.unwrap(), 0);
        assert_eq!(store.latest_round("g").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_and_load_community() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut community = CommunityConfig::new("g", MatchSchedule::new(5, 9, 30).unwrap());
        community.set_roles(vec!["Dev".into(), "Design".into()]).unwrap();
        community.set_blacklist(vec!["mallory".into()]).unwrap();
        community.pause();
        community.bot_channel_id = Some("chan-1".into());
        store.save_community(&community).await.unwrap();

        let loaded = store.load_community("g").await.unwrap().unwrap();
        assert_eq!(loaded.roles, vec!["Dev", "Design"]);
        assert_eq!(loaded.blacklist, vec!["mallory"]);
        assert_eq!(loaded.status, CommunityStatus::Paused);
        assert_eq!(loaded.schedule, MatchSchedule::new(5, 9, 30).unwrap());
        assert_eq!(loaded.bot_channel_id.as_deref(), Some("chan-1"));
        assert!(store.load_community("missing").await.unwrap().is_none());
    }
}
