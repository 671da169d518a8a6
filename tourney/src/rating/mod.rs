//! Elo ratings.
//!
//! Ratings are global (not tournament-scoped) and default to
//! [`DEFAULT_RATING`] for anyone without a record.

pub mod elo;
pub mod store;

pub use elo::{DEFAULT_RATING, K_FACTOR, RatingChange, RatingUpdate, expected_score, update_elo};
pub use store::{RatingBook, RatingStore};
