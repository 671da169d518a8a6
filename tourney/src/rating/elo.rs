//! Elo rating calculation

use serde::{Deserialize, Serialize};

use crate::tournament::ParticipantId;

/// Seed rating for participants with no record
pub const DEFAULT_RATING: f64 = 1200.0;

/// K-factor for Elo updates (higher = more volatile)
pub const K_FACTOR: f64 = 32.0;

/// Expected score of a player rated `r_a` against one rated `r_b`
pub fn expected_score(r_a: f64, r_b: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((r_b - r_a) / 400.0))
}

/// New ratings `(a, b)` after a game where A scored `score_a`.
///
/// `score_a` is 1 for a win by A, 0 for a loss, 0.5 for a draw. Ratings are
/// unbounded.
pub fn update_elo(r_a: f64, r_b: f64, score_a: f64, k: f64) -> (f64, f64) {
    let new_a = r_a + k * (score_a - expected_score(r_a, r_b));
    let new_b = r_b + k * ((1.0 - score_a) - expected_score(r_b, r_a));
    (new_a, new_b)
}

/// One participant's rating before and after a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingChange {
    pub participant_id: ParticipantId,
    pub before: f64,
    pub after: f64,
}

impl RatingChange {
    pub fn delta(&self) -> f64 {
        self.after - self.before
    }
}

/// Both sides of a reported result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub winner: RatingChange,
    pub loser: RatingChange,
}
