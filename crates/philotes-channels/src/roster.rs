//! Community roster loaded from TOML.
//!
//! ```toml
//! [[members]]
//! id = "1001"
//! username = "ada"
//! roles = ["Matching"]
//!
//! [[members]]
//! id = "9000"
//! username = "philotes"
//! bot = true
//! ```

use philotes_core::error::{PhilotesError, Result};
use philotes_core::types::ParticipantSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A community member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub bot: bool,
}

impl Member {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Blacklist entries may name either the username or the ID.
    pub fn is_blacklisted(&self, blacklist: &[String]) -> bool {
        blacklist.iter().any(|b| *b == self.username || *b == self.id)
    }
}

/// All members of a community.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Roster {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| PhilotesError::Roster(format!("Failed to parse roster: {e}")))
    }

    /// Load the roster file. A missing file is an empty roster.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!("⚠️ Roster file {} not found, using empty roster", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| PhilotesError::Roster(format!("Failed to read roster: {e}")))?;
        Self::from_toml(&content)
    }

    /// IDs of non-bot members holding any of `roles` and not blacklisted.
    pub fn eligible(&self, roles: &[String], blacklist: &[String]) -> ParticipantSet {
        let mut ids = ParticipantSet::new();
        for role in roles {
            let holders: Vec<&Member> = self
                .members
                .iter()
                .filter(|m| m.has_role(role))
                .collect();
            if holders.is_empty() {
                tracing::debug!("Role '{role}' has no members");
                continue;
            }
            ids.extend(
                holders
                    .into_iter()
                    .filter(|m| !m.bot && !m.is_blacklisted(blacklist))
                    .map(|m| m.id.clone()),
            );
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = r#"
[[members]]
id = "1"
username = "ada"
roles = ["Dev"]

[[members]]
id = "2"
username = "grace"
roles = ["Dev", "Design"]

[[members]]
id = "3"
username = "alan"
roles = ["Design"]

[[members]]
id = "4"
username = "mallory"
roles = ["Dev"]

[[members]]
id = "9"
username = "philotes"
roles = ["Dev"]
bot = true
"#;

    fn ids(set: &ParticipantSet) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_union_of_roles_without_bots() {
        let roster = Roster::from_toml(ROSTER).unwrap();
        let set = roster.eligible(&["Dev".into(), "Design".into()], &[]);
        assert_eq!(ids(&set), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_blacklist_by_username_or_id() {
        let roster = Roster::from_toml(ROSTER).unwrap();
        let set = roster.eligible(&["Dev".into()], &["mallory".into(), "1".into()]);
        assert_eq!(ids(&set), vec!["2"]);
    }

    #[test]
    fn test_unknown_role_is_skipped() {
        let roster = Roster::from_toml(ROSTER).unwrap();
        assert!(roster.eligible(&["Nobody".into()], &[]).is_empty());
    }

    #[test]
    fn test_missing_file_is_empty_roster() {
        let path = std::env::temp_dir().join("philotes-no-such-roster.toml");
        assert!(Roster::load(&path).unwrap().members.is_empty());
    }

    #[test]
    fn test_malformed_roster_is_an_error() {
        assert!(Roster::from_toml("[[members]]\nid = 1").is_err());
    }
}
