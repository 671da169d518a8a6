//! Tournament error types.

use thiserror::Error;

use super::models::{ParticipantId, TournamentStatus};

/// Domain errors for a single tournament command.
///
/// Every variant is terminal for the command that produced it and the
/// tournament it was issued against is left unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TournamentError {
    /// Participant already has a roster entry
    #[error("Participant already registered: {0}")]
    AlreadyRegistered(ParticipantId),

    /// Participant has no roster entry
    #[error("Participant not registered: {0}")]
    NotRegistered(ParticipantId),

    /// Organizer locked the tournament
    #[error("Tournament is locked and not accepting joins")]
    Locked,

    /// All confirmed slots are taken
    #[error("Tournament is full: all {capacity} confirmed slots taken")]
    Full { capacity: usize },

    /// Waitlist promotion with no free slot
    #[error("No capacity to promote: all {capacity} confirmed slots taken")]
    NoCapacity { capacity: usize },

    /// Waitlist promotion with nobody waiting
    #[error("No waitlisted participants to promote")]
    EmptyWaitlist,

    /// Start or bracket with nobody confirmed
    #[error("No confirmed participants")]
    NoConfirmedPlayers,

    /// Settings or arguments no tournament can run with
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Persisted state that cannot be interpreted
    #[error("Corrupt tournament state: {0}")]
    CorruptState(String),

    /// Roster or start command after start
    #[error("Tournament already started")]
    AlreadyStarted,

    /// Status change the state machine does not allow
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: TournamentStatus,
        to: TournamentStatus,
    },
}

impl TournamentError {
    /// Short message suitable for showing to the participant who issued the command
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::AlreadyRegistered(_) => "You are already registered.".to_string(),
            TournamentError::NotRegistered(_) => {
                "You are not registered in this tournament.".to_string()
            }
            TournamentError::Full { .. } => "Tournament is full (confirmed slots).".to_string(),
            // Don't echo decoder details back to chat
            TournamentError::CorruptState(_) => "Tournament data is unreadable.".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
