//! Command façade over registration, pairing and rating.
//!
//! Every call takes the current snapshot by reference and returns a new one;
//! a rejected command returns an error and no snapshot, so the caller's copy
//! is the unchanged state. The engine does no I/O. The host is expected to
//! serialize commands per tournament id.

use chrono::{DateTime, Utc};
use log::{info, warn};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::errors::{TournamentError, TournamentResult};
use super::models::{Group, MatchResult, Participant, ParticipantId, Tournament, TournamentSummary};
use crate::pairing::{self, BracketRound, Pairing};
use crate::rating::{self, K_FACTOR, RatingChange, RatingStore, RatingUpdate};

/// A single command against one tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Join {
        participant_id: ParticipantId,
    },
    Confirm {
        participant_id: ParticipantId,
        as_self: bool,
    },
    ForceConfirm {
        participant_id: ParticipantId,
    },
    Unconfirm {
        participant_id: ParticipantId,
    },
    Leave {
        participant_id: ParticipantId,
    },
    PromoteWaitlist,
    SetLock {
        locked: bool,
    },
    Start,
    Complete,
    Report {
        winner_id: ParticipantId,
        loser_id: ParticipantId,
        score: f64,
    },
    Bracket,
    SwissRound {
        round_index: usize,
        prior_results: Vec<Vec<Pairing>>,
    },
    Summary,
}

impl Command {
    /// Participants whose stored ratings the command reads and rewrites.
    ///
    /// Ratings are global, so these need not be on the roster; a host must
    /// load them before calling [`TournamentEngine::handle`].
    pub fn rated_participants(&self) -> Vec<ParticipantId> {
        match self {
            Command::Report {
                winner_id,
                loser_id,
                ..
            } => vec![winner_id.clone(), loser_id.clone()],
            _ => Vec::new(),
        }
    }
}

/// Command-specific data derived alongside the new snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommandOutput {
    /// Nothing beyond the snapshot
    Updated,
    /// Entry removed by leave
    Left(Participant),
    /// Participant confirmed by waitlist promotion
    Promoted(ParticipantId),
    /// Groups to announce at start
    Groups(Vec<Group>),
    Ratings(RatingUpdate),
    Bracket(Vec<BracketRound>),
    Pairings(Vec<Pairing>),
    Summary(TournamentSummary),
}

/// Result of a successful command
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Snapshot for the host to persist
    pub tournament: Tournament,
    pub output: CommandOutput,
}

/// Tournament engine with an injectable random source and clock
pub struct TournamentEngine<R = StdRng> {
    rng: R,
    clock: fn() -> DateTime<Utc>,
    k_factor: f64,
}

impl TournamentEngine<StdRng> {
    /// Engine seeded from the operating system
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Engine with a fixed seed, for reproducible shuffles
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for TournamentEngine<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> TournamentEngine<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            clock: Utc::now,
            k_factor: K_FACTOR,
        }
    }

    /// Replace the clock used for join and report timestamps
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_k_factor(mut self, k_factor: f64) -> Self {
        self.k_factor = k_factor;
        self
    }

    /// Apply one command.
    ///
    /// `ratings` is only consulted by [`Command::Report`].
    pub fn handle<S: RatingStore + ?Sized>(
        &mut self,
        tournament: &Tournament,
        command: Command,
        ratings: &mut S,
    ) -> TournamentResult<Outcome> {
        let result = match command {
            Command::Join { participant_id } => self
                .join(tournament, &participant_id)
                .map(|t| (t, CommandOutput::Updated)),
            Command::Confirm {
                participant_id,
                as_self,
            } => self
                .confirm(tournament, &participant_id, as_self)
                .map(|t| (t, CommandOutput::Updated)),
            Command::ForceConfirm { participant_id } => self
                .force_confirm(tournament, &participant_id)
                .map(|t| (t, CommandOutput::Updated)),
            Command::Unconfirm { participant_id } => self
                .unconfirm(tournament, &participant_id)
                .map(|t| (t, CommandOutput::Updated)),
            Command::Leave { participant_id } => self
                .leave(tournament, &participant_id)
                .map(|(t, removed)| (t, CommandOutput::Left(removed))),
            Command::PromoteWaitlist => self
                .promote_waitlist(tournament)
                .map(|(t, id)| (t, CommandOutput::Promoted(id))),
            Command::SetLock { locked } => {
                Ok((self.set_lock(tournament, locked), CommandOutput::Updated))
            }
            Command::Start => self
                .start(tournament)
                .map(|(t, groups)| (t, CommandOutput::Groups(groups))),
            Command::Complete => self
                .complete(tournament)
                .map(|t| (t, CommandOutput::Updated)),
            Command::Report {
                winner_id,
                loser_id,
                score,
            } => self
                .report(tournament, &winner_id, &loser_id, score, ratings)
                .map(|(t, update)| (t, CommandOutput::Ratings(update))),
            Command::Bracket => self
                .bracket(tournament)
                .map(|rounds| (tournament.clone(), CommandOutput::Bracket(rounds))),
            Command::SwissRound {
                round_index,
                prior_results,
            } => self
                .swiss_round(tournament, round_index, &prior_results)
                .map(|pairs| (tournament.clone(), CommandOutput::Pairings(pairs))),
            Command::Summary => Ok((
                tournament.clone(),
                CommandOutput::Summary(tournament.summary()),
            )),
        };

        match result {
            Ok((tournament, output)) => Ok(Outcome { tournament, output }),
            Err(e) => {
                warn!("tournament {}: command rejected: {}", tournament.id, e);
                Err(e)
            }
        }
    }

    pub fn join(&self, tournament: &Tournament, participant_id: &str) -> TournamentResult<Tournament> {
        let mut next = tournament.clone();
        next.join(participant_id, (self.clock)())?;
        Ok(next)
    }

    pub fn confirm(
        &self,
        tournament: &Tournament,
        participant_id: &str,
        as_self: bool,
    ) -> TournamentResult<Tournament> {
        let mut next = tournament.clone();
        next.confirm(participant_id, as_self)?;
        Ok(next)
    }

    pub fn force_confirm(
        &self,
        tournament: &Tournament,
        participant_id: &str,
    ) -> TournamentResult<Tournament> {
        let mut next = tournament.clone();
        next.force_confirm(participant_id, (self.clock)())?;
        Ok(next)
    }

    pub fn unconfirm(
        &self,
        tournament: &Tournament,
        participant_id: &str,
    ) -> TournamentResult<Tournament> {
        let mut next = tournament.clone();
        next.unconfirm(participant_id)?;
        Ok(next)
    }

    pub fn leave(
        &self,
        tournament: &Tournament,
        participant_id: &str,
    ) -> TournamentResult<(Tournament, Participant)> {
        let mut next = tournament.clone();
        let removed = next.leave(participant_id)?;
        Ok((next, removed))
    }

    pub fn promote_waitlist(
        &self,
        tournament: &Tournament,
    ) -> TournamentResult<(Tournament, ParticipantId)> {
        let mut next = tournament.clone();
        let promoted = next.promote_waitlist()?;
        Ok((next, promoted))
    }

    pub fn set_lock(&self, tournament: &Tournament, locked: bool) -> Tournament {
        let mut next = tournament.clone();
        next.set_lock(locked);
        next
    }

    /// Generate groups from the confirmed roster and move to running.
    pub fn start(&mut self, tournament: &Tournament) -> TournamentResult<(Tournament, Vec<Group>)> {
        if tournament.status.is_started() {
            return Err(TournamentError::AlreadyStarted);
        }

        let confirmed = tournament.confirmed_ids();
        if confirmed.is_empty() {
            return Err(TournamentError::NoConfirmedPlayers);
        }

        let groups = pairing::plan_groups(&confirmed, tournament.group_size, &mut self.rng)?;

        let mut next = tournament.clone();
        next.begin(groups.clone())?;
        info!(
            "tournament {} started: {} players in {} groups of up to {}",
            next.id,
            confirmed.len(),
            groups.len(),
            next.group_size
        );
        Ok((next, groups))
    }

    /// Close a running tournament.
    pub fn complete(&self, tournament: &Tournament) -> TournamentResult<Tournament> {
        let mut next = tournament.clone();
        next.complete()?;
        info!("tournament {} completed", next.id);
        Ok(next)
    }

    /// Record a result and update both participants' ratings.
    ///
    /// Winner and loser need not be on the roster: ratings are global and the
    /// tournament only keeps the result for reference. The new ratings are
    /// written to `ratings`; persisting them is up to the host.
    pub fn report<S: RatingStore + ?Sized>(
        &self,
        tournament: &Tournament,
        winner_id: &str,
        loser_id: &str,
        score: f64,
        ratings: &mut S,
    ) -> TournamentResult<(Tournament, RatingUpdate)> {
        if winner_id == loser_id {
            return Err(TournamentError::InvalidConfig(
                "winner and loser must be different participants".to_string(),
            ));
        }
        if !score.is_finite() {
            return Err(TournamentError::InvalidConfig(format!(
                "score must be a finite number, got {score}"
            )));
        }

        let winner_before = ratings.rating_or_default(winner_id);
        let loser_before = ratings.rating_or_default(loser_id);
        let (winner_after, loser_after) =
            rating::update_elo(winner_before, loser_before, 1.0, self.k_factor);

        let mut next = tournament.clone();
        next.record_match(MatchResult {
            winner_id: winner_id.to_string(),
            loser_id: loser_id.to_string(),
            score,
            timestamp: (self.clock)(),
        });

        ratings.upsert(winner_id, winner_after);
        ratings.upsert(loser_id, loser_after);

        info!(
            "tournament {}: {} beat {} ({:.0} -> {:.0}, {:.0} -> {:.0})",
            next.id, winner_id, loser_id, winner_before, winner_after, loser_before, loser_after
        );

        Ok((
            next,
            RatingUpdate {
                winner: RatingChange {
                    participant_id: winner_id.to_string(),
                    before: winner_before,
                    after: winner_after,
                },
                loser: RatingChange {
                    participant_id: loser_id.to_string(),
                    before: loser_before,
                    after: loser_after,
                },
            },
        ))
    }

    /// Single-elimination skeleton for the confirmed roster
    pub fn bracket(&mut self, tournament: &Tournament) -> TournamentResult<Vec<BracketRound>> {
        let confirmed = tournament.confirmed_ids();
        if confirmed.is_empty() {
            return Err(TournamentError::NoConfirmedPlayers);
        }
        Ok(pairing::generate_single_elim(&confirmed, &mut self.rng))
    }

    /// Swiss pairings for the confirmed roster
    pub fn swiss_round(
        &self,
        tournament: &Tournament,
        round_index: usize,
        prior_results: &[Vec<Pairing>],
    ) -> TournamentResult<Vec<Pairing>> {
        let confirmed = tournament.confirmed_ids();
        if confirmed.is_empty() {
            return Err(TournamentError::NoConfirmedPlayers);
        }
        Ok(pairing::swiss_pairing(&confirmed, round_index, prior_results))
    }
}
