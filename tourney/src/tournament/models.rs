//! Tournament data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::errors::{TournamentError, TournamentResult};

/// Tournament ID type
pub type TournamentId = i64;

/// Opaque participant identity (a chat user id, a handle, ...)
pub type ParticipantId = String;

/// One group of participant ids announced at start
pub type Group = Vec<ParticipantId>;

/// Capacity used when the organizer gives none
pub const DEFAULT_CAPACITY: usize = 16;

/// Group size used when the organizer gives none (solo play)
pub const DEFAULT_GROUP_SIZE: usize = 1;

/// Tournament status
///
/// `Open` and `Locked` may flip either way until the tournament starts.
/// `Running` is entered only through start, `Completed` only through complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    /// Accepting joins and confirmations
    Open,
    /// Joins disabled by the organizer
    Locked,
    /// Groups generated, matches being reported
    Running,
    /// Closed by the organizer
    Completed,
}

impl TournamentStatus {
    /// Column representation used by the storage adapter
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Open => "open",
            TournamentStatus::Locked => "locked",
            TournamentStatus::Running => "running",
            TournamentStatus::Completed => "completed",
        }
    }

    /// Whether start has already happened
    pub fn is_started(&self) -> bool {
        matches!(self, TournamentStatus::Running | TournamentStatus::Completed)
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TournamentStatus {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TournamentStatus::Open),
            "locked" => Ok(TournamentStatus::Locked),
            "running" => Ok(TournamentStatus::Running),
            "completed" => Ok(TournamentStatus::Completed),
            other => Err(TournamentError::CorruptState(format!(
                "unknown tournament status '{other}'"
            ))),
        }
    }
}

/// Roster entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Participant identity, unique within a roster
    pub id: ParticipantId,
    /// Whether this entry holds a confirmed slot
    pub confirmed: bool,
    /// Join timestamp; roster order is join order
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    /// Create an unconfirmed (pre-registered) entry
    pub fn pre_registered(id: impl Into<ParticipantId>, joined_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            confirmed: false,
            joined_at,
        }
    }

    /// Create an entry that already holds a confirmed slot
    pub fn confirmed(id: impl Into<ParticipantId>, joined_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            confirmed: true,
            joined_at,
        }
    }
}

/// Reported match outcome. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner_id: ParticipantId,
    pub loser_id: ParticipantId,
    /// Winner's score as reported by the host
    pub score: f64,
    pub timestamp: DateTime<Utc>,
}

/// Organizer-supplied settings for a new tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Tournament name
    pub name: String,
    /// Creator of the tournament
    pub owner_id: ParticipantId,
    /// Maximum number of confirmed slots
    pub capacity: usize,
    /// Players per group at start (1 for solo play)
    pub group_size: usize,
}

impl TournamentConfig {
    /// Create a configuration with the default capacity and group size
    pub fn new(name: impl Into<String>, owner_id: impl Into<ParticipantId>) -> Self {
        Self {
            name: name.into(),
            owner_id: owner_id.into(),
            capacity: DEFAULT_CAPACITY,
            group_size: DEFAULT_GROUP_SIZE,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_group_size(mut self, group_size: usize) -> Self {
        self.group_size = group_size;
        self
    }

    /// Reject settings no tournament can run with
    pub fn validate(&self) -> TournamentResult<()> {
        if self.capacity == 0 {
            return Err(TournamentError::InvalidConfig(
                "capacity must be at least 1".to_string(),
            ));
        }
        if self.group_size == 0 {
            return Err(TournamentError::InvalidConfig(
                "group size must be at least 1".to_string(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(TournamentError::InvalidConfig(
                "name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// One tournament's roster and status.
///
/// Invariant: `confirmed_count() <= capacity`. Every transition in
/// [`registration`](super::registration) validates before it mutates, so a
/// rejected command leaves the value untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub owner_id: ParticipantId,
    pub capacity: usize,
    pub group_size: usize,
    pub status: TournamentStatus,
    /// Entries in join order
    pub roster: Vec<Participant>,
    /// Empty until start
    pub groups: Vec<Group>,
    pub matches: Vec<MatchResult>,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Create an open tournament with an empty roster
    pub fn new(
        id: TournamentId,
        config: TournamentConfig,
        created_at: DateTime<Utc>,
    ) -> TournamentResult<Self> {
        config.validate()?;

        Ok(Self {
            id,
            name: config.name,
            owner_id: config.owner_id,
            capacity: config.capacity,
            group_size: config.group_size,
            status: TournamentStatus::Open,
            roster: Vec::new(),
            groups: Vec::new(),
            matches: Vec::new(),
            created_at,
        })
    }

    /// Look up a roster entry
    pub fn participant(&self, participant_id: &str) -> Option<&Participant> {
        self.roster.iter().find(|p| p.id == participant_id)
    }

    pub fn is_registered(&self, participant_id: &str) -> bool {
        self.participant(participant_id).is_some()
    }

    /// Number of entries holding a confirmed slot
    pub fn confirmed_count(&self) -> usize {
        self.roster.iter().filter(|p| p.confirmed).count()
    }

    /// Whether another confirmation fits under capacity
    pub fn has_open_slot(&self) -> bool {
        self.confirmed_count() < self.capacity
    }

    /// Confirmed participant ids in join order
    pub fn confirmed_ids(&self) -> Vec<ParticipantId> {
        self.roster
            .iter()
            .filter(|p| p.confirmed)
            .map(|p| p.id.clone())
            .collect()
    }

    /// Unconfirmed entries in join order
    pub fn waitlist(&self) -> impl Iterator<Item = &Participant> + '_ {
        self.roster.iter().filter(|p| !p.confirmed)
    }

    /// Counts for an info view
    pub fn summary(&self) -> TournamentSummary {
        let confirmed = self.confirmed_count();
        TournamentSummary {
            id: self.id,
            name: self.name.clone(),
            owner_id: self.owner_id.clone(),
            status: self.status,
            capacity: self.capacity,
            group_size: self.group_size,
            confirmed,
            pre_registered: self.roster.len(),
            open_slots: self.capacity.saturating_sub(confirmed),
            matches_played: self.matches.len(),
            created_at: self.created_at,
        }
    }
}

/// Read-only tournament overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentSummary {
    pub id: TournamentId,
    pub name: String,
    pub owner_id: ParticipantId,
    pub status: TournamentStatus,
    pub capacity: usize,
    pub group_size: usize,
    /// Entries holding a confirmed slot
    pub confirmed: usize,
    /// All roster entries, confirmed or not
    pub pre_registered: usize,
    pub open_slots: usize,
    pub matches_played: usize,
    pub created_at: DateTime<Utc>,
}
