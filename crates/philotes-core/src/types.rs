//! Data model shared by the matcher and its collaborators.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Opaque participant identifier (a chat-platform user ID).
pub type ParticipantId = String;

/// The participants eligible for one round. Ordered so that a seeded
/// shuffle over it is reproducible.
pub type ParticipantSet = BTreeSet<ParticipantId>;

/// Participant → everyone they have previously shared a group with.
/// A missing entry means "no recorded pairs".
pub type HistoricalPairs = HashMap<ParticipantId, HashSet<ParticipantId>>;

/// One output unit of a round: normally a pair, a trio when absorbing the
/// odd one out, a singleton only for a one-member roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Group {
    members: Vec<ParticipantId>,
}

impl Group {
    pub fn new(members: Vec<ParticipantId>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[ParticipantId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.iter().any(|m| m == id)
    }

    /// Every unordered pair inside the group, in member order.
    /// A trio yields three pairs, a singleton none.
    pub fn pairs(&self) -> Vec<(&ParticipantId, &ParticipantId)> {
        let mut out = Vec::new();
        for (i, a) in self.members.iter().enumerate() {
            for b in &self.members[i + 1..] {
                out.push((a, b));
            }
        }
        out
    }

    pub fn into_members(self) -> Vec<ParticipantId> {
        self.members
    }
}

impl From<Vec<ParticipantId>> for Group {
    fn from(members: Vec<ParticipantId>) -> Self {
        Self::new(members)
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.members.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(ids: &[&str]) -> Group {
        Group::new(ids.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_pairs_of_trio() {
        let g = group(&["a", "b", "c"]);
        let pairs: Vec<(String, String)> = g
            .pairs()
            .into_iter()
            .map(|(a, b)| (a.clone(), b.clone()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("a".into(), "b".into()),
                ("a".into(), "c".into()),
                ("b".into(), "c".into()),
            ]
        );
    }

    #[test]
    fn test_singleton_has_no_pairs() {
        assert!(group(&["solo"]).pairs().is_empty());
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let json = serde_json::to_string(&group(&["1", "2"])).unwrap();
        assert_eq!(json, r#"["1","2"]"#);
        assert_eq!(group(&["1", "2"]).to_string(), "[1, 2]");
    }
}
