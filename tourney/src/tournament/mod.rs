//! Tournament registration and lifecycle.
//!
//! This module provides:
//! - The tournament snapshot (roster, status, groups, results)
//! - Capacity-gated join/confirm/leave transitions and waitlist promotion
//! - The [`TournamentEngine`] command façade used by hosts
//!
//! ## Example
//!
//! ```
//! use tourney::rating::RatingBook;
//! use tourney::tournament::{Command, Tournament, TournamentConfig, TournamentEngine};
//!
//! let config = TournamentConfig::new("Sunday Scrims", "organizer").with_capacity(8);
//! let tournament = Tournament::new(1, config, chrono::Utc::now()).unwrap();
//!
//! let mut engine = TournamentEngine::seeded(42);
//! let mut ratings = RatingBook::new();
//!
//! let joined = engine
//!     .handle(&tournament, Command::Join { participant_id: "alice".into() }, &mut ratings)
//!     .unwrap();
//! assert_eq!(joined.tournament.roster.len(), 1);
//! ```

pub mod engine;
pub mod errors;
pub mod models;
mod registration;

pub use engine::{Command, CommandOutput, Outcome, TournamentEngine};
pub use errors::{TournamentError, TournamentResult};
pub use models::{
    DEFAULT_CAPACITY, DEFAULT_GROUP_SIZE, Group, MatchResult, Participant, ParticipantId,
    Tournament, TournamentConfig, TournamentId, TournamentStatus, TournamentSummary,
};
