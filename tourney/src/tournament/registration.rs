//! Roster and status transitions for a single tournament.
//!
//! Each method checks every precondition before touching `self`, so an
//! `Err` return means the tournament is exactly as it was.

use chrono::{DateTime, Utc};
use log::debug;

use super::errors::{TournamentError, TournamentResult};
use super::models::{
    Group, MatchResult, Participant, ParticipantId, Tournament, TournamentStatus,
};

impl Tournament {
    fn ensure_not_started(&self) -> TournamentResult<()> {
        if self.status.is_started() {
            return Err(TournamentError::AlreadyStarted);
        }
        Ok(())
    }

    fn position(&self, participant_id: &str) -> TournamentResult<usize> {
        self.roster
            .iter()
            .position(|p| p.id == participant_id)
            .ok_or_else(|| TournamentError::NotRegistered(participant_id.to_string()))
    }

    /// Pre-register a participant.
    ///
    /// The new entry is unconfirmed and does not consume capacity, but joins
    /// are refused once every confirmed slot is taken.
    pub fn join(&mut self, participant_id: &str, now: DateTime<Utc>) -> TournamentResult<()> {
        self.ensure_not_started()?;

        if self.is_registered(participant_id) {
            return Err(TournamentError::AlreadyRegistered(participant_id.to_string()));
        }

        if self.status == TournamentStatus::Locked {
            return Err(TournamentError::Locked);
        }

        if !self.has_open_slot() {
            return Err(TournamentError::Full {
                capacity: self.capacity,
            });
        }

        self.roster
            .push(Participant::pre_registered(participant_id, now));
        debug!("tournament {}: {} pre-registered", self.id, participant_id);
        Ok(())
    }

    /// Confirm an existing entry, consuming a slot.
    ///
    /// Confirming an already-confirmed entry is a no-op and returns `false`.
    /// `as_self` only distinguishes a participant confirming their own entry
    /// from an organizer doing it for them.
    pub fn confirm(&mut self, participant_id: &str, as_self: bool) -> TournamentResult<bool> {
        self.ensure_not_started()?;
        let idx = self.position(participant_id)?;

        if self.roster[idx].confirmed {
            return Ok(false);
        }

        // Capacity is re-checked here: confirmation is what consumes a slot
        if !self.has_open_slot() {
            return Err(TournamentError::Full {
                capacity: self.capacity,
            });
        }

        self.roster[idx].confirmed = true;
        debug!(
            "tournament {}: {} confirmed{}",
            self.id,
            participant_id,
            if as_self { "" } else { " by organizer" }
        );
        Ok(true)
    }

    /// Confirm a participant, registering them first if needed.
    pub fn force_confirm(
        &mut self,
        participant_id: &str,
        now: DateTime<Utc>,
    ) -> TournamentResult<bool> {
        self.ensure_not_started()?;

        if self.is_registered(participant_id) {
            return self.confirm(participant_id, false);
        }

        if !self.has_open_slot() {
            return Err(TournamentError::Full {
                capacity: self.capacity,
            });
        }

        self.roster.push(Participant::confirmed(participant_id, now));
        debug!(
            "tournament {}: {} added and confirmed by organizer",
            self.id, participant_id
        );
        Ok(true)
    }

    /// Release a confirmed slot, keeping the entry on the waitlist.
    pub fn unconfirm(&mut self, participant_id: &str) -> TournamentResult<bool> {
        self.ensure_not_started()?;
        let idx = self.position(participant_id)?;

        let changed = self.roster[idx].confirmed;
        self.roster[idx].confirmed = false;
        debug!("tournament {}: {} unconfirmed", self.id, participant_id);
        Ok(changed)
    }

    /// Remove an entry entirely and return it.
    pub fn leave(&mut self, participant_id: &str) -> TournamentResult<Participant> {
        self.ensure_not_started()?;
        let idx = self.position(participant_id)?;

        let removed = self.roster.remove(idx);
        debug!("tournament {}: {} left", self.id, participant_id);
        Ok(removed)
    }

    /// Confirm the earliest-joined unconfirmed entry and return its id.
    pub fn promote_waitlist(&mut self) -> TournamentResult<ParticipantId> {
        self.ensure_not_started()?;

        if !self.has_open_slot() {
            return Err(TournamentError::NoCapacity {
                capacity: self.capacity,
            });
        }

        let entry = self
            .roster
            .iter_mut()
            .find(|p| !p.confirmed)
            .ok_or(TournamentError::EmptyWaitlist)?;

        entry.confirmed = true;
        debug!("tournament {}: promoted {} from waitlist", self.id, entry.id);
        Ok(entry.id.clone())
    }

    /// Flip between open and locked. Has no effect once started.
    pub fn set_lock(&mut self, locked: bool) -> bool {
        if self.status.is_started() {
            return false;
        }

        let next = if locked {
            TournamentStatus::Locked
        } else {
            TournamentStatus::Open
        };
        let changed = self.status != next;
        self.status = next;
        changed
    }

    /// Move to running with the given groups.
    pub fn begin(&mut self, groups: Vec<Group>) -> TournamentResult<()> {
        self.ensure_not_started()?;

        if self.confirmed_count() == 0 {
            return Err(TournamentError::NoConfirmedPlayers);
        }

        self.groups = groups;
        self.status = TournamentStatus::Running;
        Ok(())
    }

    /// Move from running to completed.
    pub fn complete(&mut self) -> TournamentResult<()> {
        if self.status != TournamentStatus::Running {
            return Err(TournamentError::InvalidTransition {
                from: self.status,
                to: TournamentStatus::Completed,
            });
        }

        self.status = TournamentStatus::Completed;
        Ok(())
    }

    /// Append a reported result.
    pub fn record_match(&mut self, result: MatchResult) {
        self.matches.push(result);
    }
}
