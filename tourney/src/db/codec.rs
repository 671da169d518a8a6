//! Row encoding for persisted tournaments.
//!
//! A stored tournament is a handful of scalar columns plus JSON text columns
//! for the roster, results and groups. Encoding always writes the current
//! shape. Decoding also accepts older shapes (rosters stored as bare id
//! arrays, records with missing fields, results stored as `a`/`b`/`winner`)
//! and upgrades them; anything else is reported as corrupt instead of being
//! dropped.

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::errors::{StorageError, StorageResult};
use crate::tournament::{
    DEFAULT_CAPACITY, DEFAULT_GROUP_SIZE, Group, MatchResult, Participant, Tournament,
    TournamentId, TournamentStatus,
};

/// One `tournaments` row as stored.
///
/// Nullable columns are `Option`; the field aliases let exported rows from
/// older deployments be imported unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentRecord {
    #[serde(default)]
    pub id: TournamentId,
    pub name: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default, alias = "total_slots")]
    pub capacity: Option<i64>,
    /// Older exports may carry only this; used when `capacity` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_players: Option<i64>,
    #[serde(default)]
    pub group_size: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub players: Option<String>,
    #[serde(default)]
    pub matches: Option<String>,
    #[serde(default, alias = "groups")]
    pub player_groups: Option<String>,
    /// Unix seconds
    #[serde(default)]
    pub created_at: Option<i64>,
}

/// A decoded tournament and whether any legacy shape had to be upgraded
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub tournament: Tournament,
    pub upgraded: bool,
}

#[derive(Serialize)]
struct ParticipantRow<'a> {
    id: &'a str,
    confirmed: bool,
    /// Unix milliseconds
    joined_at: i64,
}

#[derive(Serialize)]
struct MatchRow<'a> {
    winner_id: &'a str,
    loser_id: &'a str,
    score: f64,
    /// Unix milliseconds
    timestamp: i64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredParticipant {
    Record {
        #[serde(default)]
        id: Option<serde_json::Value>,
        #[serde(default)]
        confirmed: Option<bool>,
        #[serde(default)]
        joined_at: Option<i64>,
    },
    LegacyId(String),
    LegacyNumericId(u64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredMatch {
    Current {
        winner_id: String,
        loser_id: String,
        score: f64,
        timestamp: i64,
    },
    Legacy {
        #[serde(default)]
        a: Option<String>,
        #[serde(default)]
        b: Option<String>,
        winner: String,
        #[serde(default)]
        score: Option<f64>,
        #[serde(default)]
        ts: Option<i64>,
    },
}

/// Encode a tournament into its row shape
pub fn encode(tournament: &Tournament) -> StorageResult<TournamentRecord> {
    let players: Vec<ParticipantRow<'_>> = tournament
        .roster
        .iter()
        .map(|p| ParticipantRow {
            id: &p.id,
            confirmed: p.confirmed,
            joined_at: p.joined_at.timestamp_millis(),
        })
        .collect();

    let matches: Vec<MatchRow<'_>> = tournament
        .matches
        .iter()
        .map(|m| MatchRow {
            winner_id: &m.winner_id,
            loser_id: &m.loser_id,
            score: m.score,
            timestamp: m.timestamp.timestamp_millis(),
        })
        .collect();

    Ok(TournamentRecord {
        id: tournament.id,
        name: tournament.name.clone(),
        owner_id: Some(tournament.owner_id.clone()),
        capacity: Some(to_column(tournament.capacity)),
        max_players: None,
        group_size: Some(to_column(tournament.group_size)),
        status: Some(tournament.status.as_str().to_string()),
        players: Some(serde_json::to_string(&players)?),
        matches: Some(serde_json::to_string(&matches)?),
        player_groups: Some(serde_json::to_string(&tournament.groups)?),
        created_at: Some(tournament.created_at.timestamp()),
    })
}

fn to_column(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Decode a row, upgrading legacy shapes
pub fn decode(record: &TournamentRecord) -> StorageResult<Decoded> {
    let id = record.id;
    let corrupt = |reason: String| StorageError::Corrupt { id, reason };
    let mut upgraded = false;

    let created_at = match record.created_at {
        Some(secs) => DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| corrupt(format!("created_at out of range: {secs}")))?,
        None => {
            upgraded = true;
            Utc::now()
        }
    };

    let capacity = positive(record.capacity.or(record.max_players), DEFAULT_CAPACITY)
        .map_err(|v| corrupt(format!("capacity must be positive, got {v}")))?;
    let group_size = positive(record.group_size, DEFAULT_GROUP_SIZE)
        .map_err(|v| corrupt(format!("group_size must be positive, got {v}")))?;

    let status = match record.status.as_deref() {
        Some(s) => s
            .parse::<TournamentStatus>()
            .map_err(|e| corrupt(e.to_string()))?,
        None => TournamentStatus::Open,
    };

    let (roster, roster_upgraded) = decode_roster(record.players.as_deref(), created_at)
        .map_err(|reason| corrupt(format!("players: {reason}")))?;
    let (matches, matches_upgraded) = decode_matches(record.matches.as_deref(), created_at)
        .map_err(|reason| corrupt(format!("matches: {reason}")))?;
    let groups: Vec<Group> = serde_json::from_str(json_or_empty(record.player_groups.as_deref()))
        .map_err(|e| corrupt(format!("groups: {e}")))?;

    let tournament = Tournament {
        id,
        name: record.name.clone(),
        owner_id: record.owner_id.clone().unwrap_or_default(),
        capacity,
        group_size,
        status,
        roster,
        groups,
        matches,
        created_at,
    };

    if tournament.confirmed_count() > tournament.capacity {
        return Err(corrupt(format!(
            "{} confirmed entries exceed capacity {}",
            tournament.confirmed_count(),
            tournament.capacity
        )));
    }

    upgraded |= roster_upgraded || matches_upgraded;
    if upgraded {
        warn!("tournament {id}: upgraded legacy record shape");
    }

    Ok(Decoded {
        tournament,
        upgraded,
    })
}

fn positive(value: Option<i64>, default: usize) -> Result<usize, i64> {
    match value {
        None => Ok(default),
        Some(v) if v > 0 => usize::try_from(v).map_err(|_| v),
        Some(v) => Err(v),
    }
}

fn json_or_empty(column: Option<&str>) -> &str {
    match column.map(str::trim) {
        None | Some("") | Some("null") => "[]",
        Some(json) => json,
    }
}

fn timestamp_millis(ms: i64) -> Result<DateTime<Utc>, String> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| format!("timestamp out of range: {ms}"))
}

fn decode_roster(
    column: Option<&str>,
    created_at: DateTime<Utc>,
) -> Result<(Vec<Participant>, bool), String> {
    let stored: Vec<StoredParticipant> =
        serde_json::from_str(json_or_empty(column)).map_err(|e| e.to_string())?;

    let mut upgraded = false;
    let mut seen = HashSet::new();
    let mut roster = Vec::with_capacity(stored.len());

    for (idx, entry) in stored.into_iter().enumerate() {
        let participant = match entry {
            StoredParticipant::Record {
                id,
                confirmed,
                joined_at,
            } => {
                let id = match id {
                    Some(serde_json::Value::String(s)) if !s.is_empty() => s,
                    Some(serde_json::Value::Number(n)) => {
                        upgraded = true;
                        n.to_string()
                    }
                    _ => return Err(format!("entry {idx} has no usable id")),
                };
                let joined_at = match joined_at {
                    Some(ms) => timestamp_millis(ms).map_err(|e| format!("entry {idx}: {e}"))?,
                    None => {
                        upgraded = true;
                        created_at
                    }
                };
                upgraded |= confirmed.is_none();
                Participant {
                    id,
                    confirmed: confirmed.unwrap_or(false),
                    joined_at,
                }
            }
            StoredParticipant::LegacyId(id) => {
                upgraded = true;
                Participant::pre_registered(id, created_at)
            }
            StoredParticipant::LegacyNumericId(id) => {
                upgraded = true;
                Participant::pre_registered(id.to_string(), created_at)
            }
        };

        if !seen.insert(participant.id.clone()) {
            return Err(format!("duplicate participant {}", participant.id));
        }
        roster.push(participant);
    }

    Ok((roster, upgraded))
}

fn decode_matches(
    column: Option<&str>,
    created_at: DateTime<Utc>,
) -> Result<(Vec<MatchResult>, bool), String> {
    let stored: Vec<StoredMatch> =
        serde_json::from_str(json_or_empty(column)).map_err(|e| e.to_string())?;

    let mut upgraded = false;
    let mut matches = Vec::with_capacity(stored.len());

    for (idx, entry) in stored.into_iter().enumerate() {
        let result = match entry {
            StoredMatch::Current {
                winner_id,
                loser_id,
                score,
                timestamp,
            } => MatchResult {
                winner_id,
                loser_id,
                score,
                timestamp: timestamp_millis(timestamp).map_err(|e| format!("entry {idx}: {e}"))?,
            },
            StoredMatch::Legacy {
                a,
                b,
                winner,
                score,
                ts,
            } => {
                upgraded = true;
                let loser_id = [a, b]
                    .into_iter()
                    .flatten()
                    .find(|id| *id != winner)
                    .ok_or_else(|| format!("entry {idx} has no loser"))?;
                let timestamp = match ts {
                    Some(ms) => timestamp_millis(ms).map_err(|e| format!("entry {idx}: {e}"))?,
                    None => created_at,
                };
                MatchResult {
                    winner_id: winner,
                    loser_id,
                    score: score.unwrap_or(1.0),
                    timestamp,
                }
            }
        };
        matches.push(result);
    }

    Ok((matches, upgraded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::TournamentConfig;
    use chrono::TimeZone;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap()
    }

    fn record(players: &str) -> TournamentRecord {
        TournamentRecord {
            id: 3,
            name: "Legacy Cup".to_string(),
            owner_id: Some("owner".to_string()),
            capacity: Some(4),
            max_players: None,
            group_size: Some(2),
            status: Some("open".to_string()),
            players: Some(players.to_string()),
            matches: Some("[]".to_string()),
            player_groups: Some("[]".to_string()),
            created_at: Some(created().timestamp()),
        }
    }

    fn sample() -> Tournament {
        let config = TournamentConfig::new("Encode Cup", "owner")
            .with_capacity(4)
            .with_group_size(2);
        let mut t = Tournament::new(9, config, created()).unwrap();
        t.join("alice", created()).unwrap();
        t.force_confirm("bob", created()).unwrap();
        t.record_match(MatchResult {
            winner_id: "bob".to_string(),
            loser_id: "alice".to_string(),
            score: 2.0,
            timestamp: created(),
        });
        t
    }

    #[test]
    fn test_encoded_tournament_decodes_unchanged() {
        let t = sample();
        let decoded = decode(&encode(&t).unwrap()).unwrap();
        assert_eq!(decoded.tournament, t);
        assert!(!decoded.upgraded);
    }

    #[test]
    fn test_encoded_roster_shape() {
        let record = encode(&sample()).unwrap();
        let players: serde_json::Value =
            serde_json::from_str(record.players.as_deref().unwrap()).unwrap();
        assert_eq!(players[0]["id"], "alice");
        assert_eq!(players[0]["confirmed"], false);
        assert_eq!(players[1]["joined_at"], created().timestamp_millis());
    }

    #[test]
    fn test_legacy_id_array_is_upgraded() {
        let decoded = decode(&record(r#"["111", 222]"#)).unwrap();
        assert!(decoded.upgraded);

        let roster = decoded.tournament.roster;
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].id, "111");
        assert_eq!(roster[1].id, "222");
        assert!(roster.iter().all(|p| !p.confirmed));
        assert!(roster.iter().all(|p| p.joined_at == created()));
    }

    #[test]
    fn test_partial_records_are_normalized() {
        let decoded = decode(&record(r#"[{"id": "a"}, {"id": 5, "confirmed": true}]"#)).unwrap();
        assert!(decoded.upgraded);
        assert!(!decoded.tournament.roster[0].confirmed);
        assert_eq!(decoded.tournament.roster[1].id, "5");
        assert!(decoded.tournament.roster[1].confirmed);
    }

    #[test]
    fn test_unparsable_roster_is_corrupt() {
        let err = decode(&record("[{\"id\": ")).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { id: 3, .. }));
    }

    #[test]
    fn test_record_without_id_is_corrupt() {
        let err = decode(&record(r#"[{"confirmed": true}]"#)).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[test]
    fn test_duplicate_participants_are_corrupt() {
        let err = decode(&record(r#"["a", "a"]"#)).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_over_capacity_roster_is_corrupt() {
        let players = r#"[
            {"id": "a", "confirmed": true, "joined_at": 0},
            {"id": "b", "confirmed": true, "joined_at": 0},
            {"id": "c", "confirmed": true, "joined_at": 0},
            {"id": "d", "confirmed": true, "joined_at": 0},
            {"id": "e", "confirmed": true, "joined_at": 0}
        ]"#;
        assert!(matches!(
            decode(&record(players)),
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_null_and_empty_columns_mean_empty() {
        let mut r = record("");
        r.matches = None;
        r.player_groups = Some("null".to_string());
        let decoded = decode(&r).unwrap();
        assert!(decoded.tournament.roster.is_empty());
        assert!(decoded.tournament.matches.is_empty());
        assert!(decoded.tournament.groups.is_empty());
    }

    #[test]
    fn test_legacy_match_shape_is_upgraded() {
        let mut r = record("[]");
        r.matches = Some(r#"[{"a": "bob", "b": "alice", "winner": "alice", "score": 3, "ts": 1700000000000}]"#.to_string());
        let decoded = decode(&r).unwrap();
        assert!(decoded.upgraded);

        let m = &decoded.tournament.matches[0];
        assert_eq!(m.winner_id, "alice");
        assert_eq!(m.loser_id, "bob");
        assert_eq!(m.score, 3.0);
        assert_eq!(m.timestamp.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_unknown_status_is_corrupt() {
        let mut r = record("[]");
        r.status = Some("paused".to_string());
        assert!(matches!(decode(&r), Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn test_non_positive_capacity_is_corrupt() {
        let mut r = record("[]");
        r.capacity = Some(0);
        assert!(matches!(decode(&r), Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn test_exported_row_aliases() {
        let json = r#"{
            "id": 12, "guild_id": "g", "name": "Old Export", "owner_id": "o",
            "max_players": 8, "total_slots": 8, "group_size": 4, "status": "locked",
            "players": "[]", "matches": "[]", "groups": "[[\"x\"]]", "created_at": 1700000000
        }"#;
        let r: TournamentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.capacity, Some(8));

        let t = decode(&r).unwrap().tournament;
        assert_eq!(t.status, TournamentStatus::Locked);
        assert_eq!(t.groups, vec![vec!["x".to_string()]]);
    }

    #[test]
    fn test_max_players_used_when_slots_missing() {
        let json = r#"{
            "id": 13, "name": "Older Export", "max_players": 2, "total_slots": null,
            "players": "[{\"id\": \"a\", \"confirmed\": true}, {\"id\": \"b\", \"confirmed\": true}]"
        }"#;
        let r: TournamentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(decode(&r).unwrap().tournament.capacity, 2);

        let over = r#"{
            "id": 14, "name": "Overfull", "max_players": 1,
            "players": "[{\"id\": \"a\", \"confirmed\": true}, {\"id\": \"b\", \"confirmed\": true}]"
        }"#;
        let r: TournamentRecord = serde_json::from_str(over).unwrap();
        assert!(matches!(decode(&r), Err(StorageError::Corrupt { id: 14, .. })));
    }
}
