//! Swiss-style pairing by win count.

use log::debug;
use serde::{Deserialize, Serialize};
use std::{cmp::Reverse, collections::HashMap};

use crate::tournament::ParticipantId;

/// One pairing in a Swiss round. `slot_b` is `None` for the bye.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub slot_a: ParticipantId,
    pub slot_b: Option<ParticipantId>,
    /// Filled in by the host once the result is known
    pub winner: Option<ParticipantId>,
}

/// Pair participants for round `round_index`.
///
/// Wins are counted over every round in `prior_results`, whatever
/// `round_index` says; the index only labels the round being paired.
/// Participants are ranked by wins (descending, ties keep input order) and
/// paired consecutively. With an odd count the last-ranked participant gets
/// a bye with no winner assigned.
pub fn swiss_pairing(
    ids: &[ParticipantId],
    round_index: usize,
    prior_results: &[Vec<Pairing>],
) -> Vec<Pairing> {
    let mut wins: HashMap<&str, usize> = HashMap::new();
    for winner in prior_results
        .iter()
        .flatten()
        .filter_map(|p| p.winner.as_deref())
    {
        *wins.entry(winner).or_insert(0) += 1;
    }

    let mut ranked: Vec<&ParticipantId> = ids.iter().collect();
    // sort_by_key is stable
    ranked.sort_by_key(|id| Reverse(wins.get(id.as_str()).copied().unwrap_or(0)));

    debug!(
        "swiss round {round_index}: ranking {} players over {} prior rounds",
        ids.len(),
        prior_results.len()
    );

    ranked
        .chunks(2)
        .map(|pair| Pairing {
            slot_a: pair[0].clone(),
            slot_b: pair.get(1).map(|id| (*id).clone()),
            winner: None,
        })
        .collect()
}
