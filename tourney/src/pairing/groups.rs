//! Fixed-size grouping with a round-robin fallback.

use log::debug;
use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::tournament::{Group, ParticipantId, TournamentError, TournamentResult};

/// How participants are ordered before chunking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMethod {
    /// Shuffle first
    #[default]
    Random,
    /// Keep the given order
    Ordered,
}

fn check_group_size(group_size: usize) -> TournamentResult<()> {
    if group_size == 0 {
        return Err(TournamentError::InvalidConfig(
            "group size must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Chunk participants into consecutive groups of `group_size`.
///
/// The final group may be smaller. A group size of 1 yields one singleton
/// group per participant.
pub fn generate_groups<R: Rng + ?Sized>(
    ids: &[ParticipantId],
    group_size: usize,
    method: FillMethod,
    rng: &mut R,
) -> TournamentResult<Vec<Group>> {
    check_group_size(group_size)?;

    let mut players = ids.to_vec();
    if method == FillMethod::Random {
        players.shuffle(rng);
    }

    Ok(players
        .chunks(group_size)
        .map(<[ParticipantId]>::to_vec)
        .collect())
}

/// Deal participants into `ceil(n / group_size)` groups, one at a time.
///
/// Participant `i` lands in group `i mod group_count`, so the remainder is
/// spread across groups instead of forming one short trailing group.
pub fn distribute_round_robin(
    ids: &[ParticipantId],
    group_size: usize,
) -> TournamentResult<Vec<Group>> {
    check_group_size(group_size)?;

    let group_count = ids.len().div_ceil(group_size);
    let mut groups: Vec<Group> = vec![Vec::new(); group_count];
    for (i, id) in ids.iter().enumerate() {
        groups[i % group_count].push(id.clone());
    }
    Ok(groups)
}

/// Groups announced at start.
///
/// Random chunking first; if that leaves more than one group and the last
/// one holds at most half a group, redistribute round-robin instead.
pub fn plan_groups<R: Rng + ?Sized>(
    ids: &[ParticipantId],
    group_size: usize,
    rng: &mut R,
) -> TournamentResult<Vec<Group>> {
    let groups = generate_groups(ids, group_size, FillMethod::Random, rng)?;

    let undersized_tail = groups.len() > 1
        && groups
            .last()
            .is_some_and(|last| last.len() <= group_size / 2);

    if undersized_tail {
        debug!(
            "{} players in groups of {} leave a short last group, redistributing",
            ids.len(),
            group_size
        );
        return distribute_round_robin(ids, group_size);
    }

    Ok(groups)
}
