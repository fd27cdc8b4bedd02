//! Pairing engine: greedy, single-pass, history-aware.
//!
//! After shuffling, participants are visited in order. Each unpaired
//! candidate takes the first still-unpaired participant they have never met,
//! or the first unpaired participant if everyone left is a repeat. When only
//! one or two others remain they all join the candidate in a final group, so
//! nobody is left alone (a trio absorbs an odd count).
//!
//! This is first-fit, not globally optimal: it does not minimize the total
//! number of repeats in a round, and the final group ignores history.

use philotes_core::types::{Group, HistoricalPairs, ParticipantId, ParticipantSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::shuffle::fisher_yates_shuffle;

/// Shuffle `participants` with `rng`, then pair them.
pub fn compute_groups<R: Rng + ?Sized>(
    participants: &ParticipantSet,
    history: &HistoricalPairs,
    rng: &mut R,
) -> Vec<Group> {
    let mut order: Vec<ParticipantId> = participants.iter().cloned().collect();
    fisher_yates_shuffle(&mut order, rng);
    tracing::debug!("🔀 Shuffled {} participants", order.len());
    pair_in_order(&order, history)
}

/// Pair participants visiting them in exactly the given order.
///
/// `order` must not contain duplicates. The result covers every entry of
/// `order` exactly once.
pub fn pair_in_order(order: &[ParticipantId], history: &HistoricalPairs) -> Vec<Group> {
    let mut groups = Vec::with_capacity(order.len() / 2 + 1);
    let mut paired = vec![false; order.len()];

    for i in 0..order.len() {
        if paired[i] {
            continue;
        }
        let candidate = &order[i];
        let remaining: Vec<usize> = (0..order.len())
            .filter(|&j| j != i && !paired[j])
            .collect();

        // One or two left besides the candidate: only one grouping exists.
        if remaining.len() == 1 || remaining.len() == 2 {
            let mut members = Vec::with_capacity(remaining.len() + 1);
            members.push(candidate.clone());
            members.extend(remaining.iter().map(|&j| order[j].clone()));
            groups.push(Group::new(members));
            break;
        }

        let Some(&fallback) = remaining.first() else {
            // A roster of one: nobody to pair with.
            paired[i] = true;
            groups.push(Group::new(vec![candidate.clone()]));
            continue;
        };

        let met = history.get(candidate);
        let partner = remaining
            .iter()
            .copied()
            .find(|&j| !met.is_some_and(|seen| seen.contains(&order[j])))
            .unwrap_or(fallback);

        paired[i] = true;
        paired[partner] = true;
        groups.push(Group::new(vec![candidate.clone(), order[partner].clone()]));
    }

    groups
}

/// Number of pairs inside `groups` that already met according to `history`
/// (checked from both sides).
pub fn repeat_pairings(groups: &[Group], history: &HistoricalPairs) -> usize {
    let met = |a: &ParticipantId, b: &ParticipantId| {
        history.get(a).is_some_and(|s| s.contains(b)) || history.get(b).is_some_and(|s| s.contains(a))
    };
    groups
        .iter()
        .flat_map(|g| g.pairs())
        .filter(|(a, b)| met(*a, *b))
        .count()
}

/// Pairing engine with an injectable random source.
///
/// With a seed every call is reproducible; without one each call draws a
/// fresh generator from OS entropy.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairingEngine {
    seed: Option<u64>,
}

impl PairingEngine {
    pub fn new() -> Self {
        Self { seed: None }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Compute the groups of one round.
    pub fn compute(&self, participants: &ParticipantSet, history: &HistoricalPairs) -> Vec<Group> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let groups = compute_groups(participants, history, &mut rng);
        tracing::debug!(
            "🤝 {} participants → {} groups ({} repeat pairings)",
            participants.len(),
            groups.len(),
            repeat_pairings(&groups, history)
        );
        groups
    }
}
