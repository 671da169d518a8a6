//! Plain-text rendering of command results.

use tourney::pairing::{BracketRound, Pairing};
use tourney::rating::{RatingChange, RatingUpdate};
use tourney::tournament::{CommandOutput, Group, Tournament, TournamentSummary};

fn slot(id: Option<&str>) -> &str {
    id.unwrap_or("BYE")
}

pub fn summary(summary: &TournamentSummary) -> String {
    [
        format!("#{} {} [{}]", summary.id, summary.name, summary.status),
        format!("Owner: {}", summary.owner_id),
        format!(
            "Slots: {}/{} confirmed, {} open",
            summary.confirmed, summary.capacity, summary.open_slots
        ),
        format!("Pre-registered: {}", summary.pre_registered),
        format!("Group size: {}", summary.group_size),
        format!("Matches played: {}", summary.matches_played),
        format!("Created: {}", summary.created_at.format("%Y-%m-%d %H:%M UTC")),
    ]
    .join("\n")
}

/// Confirmed entries first, then the waitlist in join order
pub fn roster(tournament: &Tournament) -> String {
    let mut lines = vec![format!(
        "Confirmed ({}/{}):",
        tournament.confirmed_count(),
        tournament.capacity
    )];
    lines.extend(
        tournament
            .roster
            .iter()
            .filter(|p| p.confirmed)
            .map(|p| format!("  {}", p.id)),
    );

    let waitlist: Vec<String> = tournament
        .waitlist()
        .enumerate()
        .map(|(i, p)| format!("  {}. {}", i + 1, p.id))
        .collect();
    if !waitlist.is_empty() {
        lines.push("Waitlist:".to_string());
        lines.extend(waitlist);
    }

    lines.join("\n")
}

pub fn groups(groups: &[Group]) -> String {
    groups
        .iter()
        .enumerate()
        .map(|(i, g)| format!("Group {}: {}", i + 1, g.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn bracket(rounds: &[BracketRound]) -> String {
    let mut lines = Vec::new();
    for round in rounds {
        lines.push(format!("Round {}", round.round_index + 1));
        for m in &round.matches {
            let mut line = format!(
                "  {}: {} vs {}",
                m.id,
                slot(m.slot_a.as_deref()),
                slot(m.slot_b.as_deref())
            );
            if let Some(winner) = &m.winner {
                line.push_str(&format!(" -> {winner}"));
            }
            lines.push(line);
        }
    }
    lines.join("\n")
}

pub fn pairings(pairings: &[Pairing]) -> String {
    pairings
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "Table {}: {} vs {}",
                i + 1,
                p.slot_a,
                slot(p.slot_b.as_deref())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn rating_change(change: &RatingChange) -> String {
    format!(
        "{}: {:.0} -> {:.0} ({:+.1})",
        change.participant_id,
        change.before,
        change.after,
        change.delta()
    )
}

pub fn rating_update(update: &RatingUpdate) -> String {
    format!(
        "Result recorded.\n{}\n{}",
        rating_change(&update.winner),
        rating_change(&update.loser)
    )
}

pub fn leaderboard(entries: &[(String, f64)]) -> String {
    if entries.is_empty() {
        return "No ratings yet.".to_string();
    }
    entries
        .iter()
        .enumerate()
        .map(|(i, (id, rating))| format!("{:>3}. {id} {rating:.0}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text for one engine command result
pub fn output(tournament: &Tournament, output: &CommandOutput) -> String {
    match output {
        CommandOutput::Updated => format!(
            "{} [{}]\n{}",
            tournament.name,
            tournament.status,
            roster(tournament)
        ),
        CommandOutput::Left(participant) => format!(
            "{} left {}.\n{}",
            participant.id,
            tournament.name,
            roster(tournament)
        ),
        CommandOutput::Promoted(id) => format!("Promoted {id} from the waitlist."),
        CommandOutput::Groups(g) => format!("{} started.\n{}", tournament.name, groups(g)),
        CommandOutput::Ratings(update) => rating_update(update),
        CommandOutput::Bracket(rounds) => bracket(rounds),
        CommandOutput::Pairings(p) => pairings(p),
        CommandOutput::Summary(s) => summary(s),
    }
}
