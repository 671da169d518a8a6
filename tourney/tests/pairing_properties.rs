/// Property-based tests for pairing and registration invariants
///
/// These check that capacity is never exceeded under arbitrary command
/// sequences and that group and bracket generation keep every participant.
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};
use std::collections::BTreeSet;
use tourney::pairing::{FillMethod, generate_groups, generate_single_elim, plan_groups, swiss_pairing};
use tourney::rating::{DEFAULT_RATING, update_elo};
use tourney::tournament::{Tournament, TournamentConfig};

fn ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("u{i}")).collect()
}

#[derive(Debug, Clone)]
enum Op {
    Join(u8),
    Confirm(u8),
    ForceConfirm(u8),
    Unconfirm(u8),
    Leave(u8),
    Promote,
    Lock(bool),
}

// Strategy over a small id space so operations collide often
fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..8).prop_map(Op::Join),
        (0u8..8).prop_map(Op::Confirm),
        (0u8..8).prop_map(Op::ForceConfirm),
        (0u8..8).prop_map(Op::Unconfirm),
        (0u8..8).prop_map(Op::Leave),
        Just(Op::Promote),
        any::<bool>().prop_map(Op::Lock),
    ]
}

// Apply one operation, keeping the previous state when it is rejected
fn apply_op(t: &mut Tournament, op: Op, now: chrono::DateTime<chrono::Utc>) {
    let mut next = t.clone();
    let result = match op {
        Op::Join(i) => next.join(&format!("u{i}"), now).map(|_| ()),
        Op::Confirm(i) => next.confirm(&format!("u{i}"), true).map(|_| ()),
        Op::ForceConfirm(i) => next.force_confirm(&format!("u{i}"), now).map(|_| ()),
        Op::Unconfirm(i) => next.unconfirm(&format!("u{i}")).map(|_| ()),
        Op::Leave(i) => next.leave(&format!("u{i}")).map(|_| ()),
        Op::Promote => next.promote_waitlist().map(|_| ()),
        Op::Lock(locked) => {
            next.set_lock(locked);
            Ok(())
        }
    };
    if result.is_ok() {
        *t = next;
    }
}

proptest! {
    #[test]
    fn prop_confirmed_never_exceeds_capacity(
        capacity in 1usize..6,
        ops in prop::collection::vec(op_strategy(), 0..60),
    ) {
        let now = chrono::Utc::now();
        let config = TournamentConfig::new("Prop Cup", "owner").with_capacity(capacity);
        let mut t = Tournament::new(1, config, now).unwrap();

        for op in ops {
            apply_op(&mut t, op, now);

            prop_assert!(t.confirmed_count() <= t.capacity);
            let unique: BTreeSet<_> = t.roster.iter().map(|p| &p.id).collect();
            prop_assert_eq!(unique.len(), t.roster.len());
        }
    }

    #[test]
    fn prop_join_then_leave_restores_roster(
        capacity in 1usize..6,
        ops in prop::collection::vec(op_strategy(), 0..40),
    ) {
        let now = chrono::Utc::now();
        let config = TournamentConfig::new("Prop Cup", "owner").with_capacity(capacity);
        let mut t = Tournament::new(1, config, now).unwrap();
        for op in ops {
            apply_op(&mut t, op, now);
        }

        // Outside the u0..u7 id space, so never already registered
        let before = t.roster.clone();
        match t.join("fresh", now) {
            Ok(()) => {
                prop_assert_eq!(t.roster.len(), before.len() + 1);
                let left = t.leave("fresh").unwrap();
                prop_assert_eq!(left.id.as_str(), "fresh");
                prop_assert!(!left.confirmed);
            }
            Err(_) => prop_assert!(t.participant("fresh").is_none()),
        }
        prop_assert_eq!(&t.roster, &before);
    }

    #[test]
    fn prop_groups_partition_participants(n in 0usize..64, size in 1usize..9, seed in any::<u64>()) {
        let players = ids(n);
        let groups = generate_groups(&players, size, FillMethod::Random, &mut StdRng::seed_from_u64(seed)).unwrap();

        prop_assert_eq!(groups.len(), n.div_ceil(size));
        prop_assert!(groups.iter().all(|g| !g.is_empty() && g.len() <= size));

        let flat: BTreeSet<_> = groups.iter().flatten().cloned().collect();
        prop_assert_eq!(flat, players.iter().cloned().collect::<BTreeSet<_>>());
    }

    #[test]
    fn prop_planned_groups_keep_everyone(n in 1usize..64, size in 1usize..9, seed in any::<u64>()) {
        let players = ids(n);
        let groups = plan_groups(&players, size, &mut StdRng::seed_from_u64(seed)).unwrap();

        let total: usize = groups.iter().map(Vec::len).sum();
        prop_assert_eq!(total, n);
        prop_assert!(groups.iter().all(|g| g.len() <= size));
    }

    #[test]
    fn prop_bracket_shape(n in 2usize..100, seed in any::<u64>()) {
        let players = ids(n);
        let rounds = generate_single_elim(&players, &mut StdRng::seed_from_u64(seed));

        let expected_rounds = n.next_power_of_two().trailing_zeros() as usize;
        prop_assert_eq!(rounds.len(), expected_rounds);
        prop_assert_eq!(rounds[0].matches.len(), n.div_ceil(2));
        prop_assert_eq!(rounds.last().unwrap().matches.len(), 1);

        let seated: Vec<_> = rounds[0]
            .matches
            .iter()
            .flat_map(|m| [m.slot_a.clone(), m.slot_b.clone()])
            .flatten()
            .collect();
        prop_assert_eq!(seated.len(), n);
        prop_assert_eq!(
            seated.iter().cloned().collect::<BTreeSet<_>>(),
            players.iter().cloned().collect::<BTreeSet<_>>()
        );

        for m in &rounds[0].matches {
            if m.is_bye() {
                prop_assert!(m.winner.is_some());
            }
        }
    }

    #[test]
    fn prop_swiss_pairs_everyone_once(n in 1usize..40) {
        let players = ids(n);
        let pairs = swiss_pairing(&players, 0, &[]);

        prop_assert_eq!(pairs.len(), n.div_ceil(2));
        prop_assert_eq!(pairs.iter().filter(|p| p.slot_b.is_none()).count(), n % 2);
    }

    #[test]
    fn prop_elo_is_zero_sum(a in 100.0f64..3000.0, b in 100.0f64..3000.0, score in 0.0f64..=1.0) {
        let (a2, b2) = update_elo(a, b, score, 32.0);
        prop_assert!(((a2 - a) + (b2 - b)).abs() < 1e-9);
    }
}

#[test]
fn test_equal_ratings_move_by_half_k() {
    let (w, l) = update_elo(DEFAULT_RATING, DEFAULT_RATING, 1.0, 32.0);
    assert_eq!(w, 1216.0);
    assert_eq!(l, 1184.0);
}
