//! Pairing and grouping algorithms.
//!
//! Pure functions from a list of confirmed participant ids to groups,
//! bracket rounds or pairings. Anything random takes the generator as an
//! argument so callers can seed it.

pub mod elimination;
pub mod groups;
pub mod swiss;

pub use elimination::{BracketMatch, BracketRound, generate_single_elim};
pub use groups::{FillMethod, distribute_round_robin, generate_groups, plan_groups};
pub use swiss::{Pairing, swiss_pairing};
