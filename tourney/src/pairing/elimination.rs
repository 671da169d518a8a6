//! Single-elimination bracket skeleton.

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::tournament::ParticipantId;

/// One bracket match. `None` in a slot is a bye or a not-yet-known opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketMatch {
    /// `r{round}m{index}`
    pub id: String,
    pub slot_a: Option<ParticipantId>,
    pub slot_b: Option<ParticipantId>,
    pub winner: Option<ParticipantId>,
}

impl BracketMatch {
    fn new(
        round_index: usize,
        match_index: usize,
        slot_a: Option<ParticipantId>,
        slot_b: Option<ParticipantId>,
    ) -> Self {
        Self {
            id: format!("r{round_index}m{match_index}"),
            slot_a,
            slot_b,
            winner: None,
        }
    }

    /// Exactly one real participant
    pub fn is_bye(&self) -> bool {
        self.slot_a.is_some() != self.slot_b.is_some()
    }
}

/// A round of the bracket, round 0 first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketRound {
    pub round_index: usize,
    pub matches: Vec<BracketMatch>,
}

/// Build a single-elimination bracket.
///
/// Participants are shuffled and padded with byes up to the next power of
/// two, then paired consecutively in round 0. A real participant drawn
/// against a bye advances immediately. Pairs made only of padding carry no
/// one and are left out, so round 0 has `ceil(n / 2)` matches and there are
/// `ceil(log2(n))` rounds for `n > 1`. Later rounds are empty placeholders
/// (`ceil(previous / 2)` matches each) down to the final; match reporting
/// fills them in.
pub fn generate_single_elim<R: Rng + ?Sized>(
    ids: &[ParticipantId],
    rng: &mut R,
) -> Vec<BracketRound> {
    if ids.is_empty() {
        return Vec::new();
    }

    let mut players = ids.to_vec();
    players.shuffle(rng);

    let size = players.len().next_power_of_two();
    let mut padded: Vec<Option<ParticipantId>> = players.into_iter().map(Some).collect();
    padded.resize(size, None);

    let first: Vec<BracketMatch> = padded
        .chunks(2)
        .filter(|pair| pair.iter().any(Option::is_some))
        .enumerate()
        .map(|(idx, pair)| {
            let slot_a = pair[0].clone();
            let slot_b = pair.get(1).cloned().flatten();
            let mut m = BracketMatch::new(0, idx, slot_a, slot_b);
            if m.is_bye() {
                m.winner = m.slot_a.clone().or_else(|| m.slot_b.clone());
            }
            m
        })
        .collect();

    let mut rounds = vec![BracketRound {
        round_index: 0,
        matches: first,
    }];

    let mut prev_len = rounds[0].matches.len();
    while prev_len > 1 {
        let round_index = rounds.len();
        let next_len = prev_len.div_ceil(2);
        rounds.push(BracketRound {
            round_index,
            matches: (0..next_len)
                .map(|idx| BracketMatch::new(round_index, idx, None, None))
                .collect(),
        });
        prev_len = next_len;
    }

    rounds
}
