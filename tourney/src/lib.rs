//! # Tourney
//!
//! Tournament registration, pairing and Elo rating engine.
//!
//! A tournament is an immutable snapshot: every command takes the current
//! snapshot and either returns the next one or a typed rejection. Hosts
//! persist snapshots through the [`db`] repositories and drive commands
//! through [`tournament::TournamentEngine`].
//!
//! ## Lifecycle
//!
//! - **Open**: participants join (pre-registered) and confirm into a capped set of slots
//! - **Locked**: self-service joins are closed; organizers still manage the roster
//! - **Running**: groups are fixed and results are reported
//! - **Completed**: terminal
//!
//! ## Core Modules
//!
//! - [`tournament`]: Snapshot model, registration transitions and the command engine
//! - [`pairing`]: Group partitioning, single-elimination brackets and Swiss pairing
//! - [`rating`]: Elo math and rating stores
//! - [`db`]: SQLite persistence with legacy record upgrades
//!
//! ## Example
//!
//! ```
//! use tourney::pairing::generate_single_elim;
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let ids: Vec<String> = (1..=5).map(|i| format!("p{i}")).collect();
//! let bracket = generate_single_elim(&ids, &mut StdRng::seed_from_u64(7));
//!
//! assert_eq!(bracket.len(), 3);
//! assert_eq!(bracket[0].matches.len(), 3);
//! ```

/// SQLite persistence for tournaments and ratings.
pub mod db;

/// Group, bracket and Swiss pairing.
pub mod pairing;

/// Elo rating model.
pub mod rating;

/// Tournament snapshot, registration and command engine.
pub mod tournament;

pub use tournament::{
    Command, CommandOutput, Outcome, Tournament, TournamentConfig, TournamentEngine,
    TournamentError, TournamentResult, TournamentStatus,
};
