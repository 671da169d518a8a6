//! Rating lookup capability handed to the engine at report time.

use std::collections::{BTreeSet, HashMap};

use super::elo::DEFAULT_RATING;
use crate::tournament::ParticipantId;

/// Keyed read-modify-write access to ratings
pub trait RatingStore {
    /// Current rating, or `None` if the participant has never been rated
    fn rating(&self, participant_id: &str) -> Option<f64>;

    /// Insert or replace a rating
    fn upsert(&mut self, participant_id: &str, rating: f64);

    fn rating_or_default(&self, participant_id: &str) -> f64 {
        self.rating(participant_id).unwrap_or(DEFAULT_RATING)
    }
}

/// In-memory ratings that remember which entries changed.
///
/// The host loads the participants involved in a report from its store,
/// lets the engine update them here, then writes back [`RatingBook::changed`].
#[derive(Debug, Clone, Default)]
pub struct RatingBook {
    ratings: HashMap<ParticipantId, f64>,
    dirty: BTreeSet<ParticipantId>,
}

impl RatingBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a known rating without marking it changed
    pub fn with_rating(mut self, participant_id: impl Into<ParticipantId>, rating: f64) -> Self {
        self.ratings.insert(participant_id.into(), rating);
        self
    }

    /// Entries written since loading, in id order
    pub fn changed(&self) -> Vec<(ParticipantId, f64)> {
        self.dirty
            .iter()
            .filter_map(|id| self.ratings.get(id).map(|r| (id.clone(), *r)))
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// All ratings, highest first
    pub fn leaderboard(&self) -> Vec<(ParticipantId, f64)> {
        let mut entries: Vec<_> = self
            .ratings
            .iter()
            .map(|(id, rating)| (id.clone(), *rating))
            .collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries
    }
}

impl FromIterator<(ParticipantId, f64)> for RatingBook {
    fn from_iter<I: IntoIterator<Item = (ParticipantId, f64)>>(iter: I) -> Self {
        Self {
            ratings: iter.into_iter().collect(),
            dirty: BTreeSet::new(),
        }
    }
}

impl RatingStore for RatingBook {
    fn rating(&self, participant_id: &str) -> Option<f64> {
        self.ratings.get(participant_id).copied()
    }

    fn upsert(&mut self, participant_id: &str, rating: f64) {
        self.ratings.insert(participant_id.to_string(), rating);
        self.dirty.insert(participant_id.to_string());
    }
}
