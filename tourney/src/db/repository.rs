//! Repository traits over the tournament store.
//!
//! Hosts hold a `dyn TournamentRepository` / `dyn RatingRepository` so the
//! command flow can be exercised against the in-memory mock as well as SQLite.

use async_trait::async_trait;
use log::{debug, info};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::codec::{self, TournamentRecord};
use super::errors::{StorageError, StorageResult};
use crate::rating::RatingBook;
use crate::tournament::{ParticipantId, Tournament, TournamentId, TournamentResult};

const SELECT_TOURNAMENT: &str = "SELECT id, name, owner_id, capacity, group_size, status, \
     players, matches, player_groups, created_at FROM tournaments";

/// Trait for tournament persistence
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Insert a new tournament; the draft's id is ignored and the stored
    /// tournament is returned with its assigned id
    async fn create(&self, draft: &Tournament) -> StorageResult<Tournament>;

    /// Load a tournament by id
    async fn load(&self, id: TournamentId) -> StorageResult<Tournament>;

    /// Most recently created tournament, if any
    async fn latest(&self) -> StorageResult<Option<Tournament>>;

    /// Overwrite an existing tournament
    async fn save(&self, tournament: &Tournament) -> StorageResult<()>;

    /// Pretty-printed JSON of the stored row
    async fn export(&self, id: TournamentId) -> StorageResult<String>;

    /// Create a tournament from exported JSON under a fresh id
    async fn import(&self, json: &str) -> StorageResult<Tournament>;

    /// Rewrite every row still holding a legacy shape; returns how many
    async fn migrate_rosters(&self) -> StorageResult<usize>;
}

/// Trait for persisted Elo ratings
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Load the ratings of the given participants; unknown ids are absent
    async fn load_ratings(&self, participant_ids: &[&str]) -> StorageResult<RatingBook>;

    /// Persist every rating changed in `book`; returns how many were written
    async fn save_ratings(&self, book: &RatingBook) -> StorageResult<usize>;

    /// Highest ratings first
    async fn leaderboard(&self, limit: usize) -> StorageResult<Vec<(ParticipantId, f64)>>;
}

/// SQLite implementation of both repositories
#[derive(Clone)]
pub struct SqliteTournamentRepository {
    pool: SqlitePool,
}

impl SqliteTournamentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Read-modify-write one tournament inside a single transaction.
    ///
    /// `f` receives the current snapshot and a rating book preloaded with the
    /// stored ratings of `rated` (see [`Command::rated_participants`]), on the
    /// roster or not. On `Ok` the new snapshot and any changed ratings are
    /// committed together; on a domain error nothing is written and the error
    /// is handed back in the inner result.
    ///
    /// [`Command::rated_participants`]: crate::tournament::Command::rated_participants
    pub async fn apply<T, F>(
        &self,
        id: TournamentId,
        rated: &[ParticipantId],
        f: F,
    ) -> StorageResult<TournamentResult<(Tournament, T)>>
    where
        F: FnOnce(&Tournament, &mut RatingBook) -> TournamentResult<(Tournament, T)>,
    {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!("{SELECT_TOURNAMENT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StorageError::NotFound(id))?;
        let current = codec::decode(&record_from_row(&row)?)?.tournament;

        let mut book = RatingBook::new();
        for participant_id in rated {
            if let Some(rating) = fetch_rating(&mut tx, participant_id).await? {
                book = book.with_rating(participant_id.clone(), rating);
            }
        }

        let (next, output) = match f(&current, &mut book) {
            Ok(applied) => applied,
            Err(e) => {
                tx.rollback().await?;
                return Ok(Err(e));
            }
        };

        let record = codec::encode(&next)?;
        update_record(&mut tx, &record).await?;
        for (participant_id, rating) in book.changed() {
            upsert_rating(&mut tx, &participant_id, rating).await?;
        }

        tx.commit().await?;
        debug!("tournament {id}: committed {:?}", next.status);

        Ok(Ok((next, output)))
    }

    async fn insert_record(&self, record: &TournamentRecord) -> StorageResult<TournamentId> {
        let result = sqlx::query(
            "INSERT INTO tournaments (name, owner_id, capacity, group_size, status, players, matches, player_groups, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.name)
        .bind(&record.owner_id)
        .bind(record.capacity)
        .bind(record.group_size)
        .bind(&record.status)
        .bind(&record.players)
        .bind(&record.matches)
        .bind(&record.player_groups)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn fetch_record(&self, id: TournamentId) -> StorageResult<TournamentRecord> {
        let row = sqlx::query(&format!("{SELECT_TOURNAMENT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound(id))?;

        Ok(record_from_row(&row)?)
    }
}

fn record_from_row(row: &SqliteRow) -> Result<TournamentRecord, sqlx::Error> {
    Ok(TournamentRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        owner_id: row.try_get("owner_id")?,
        capacity: row.try_get("capacity")?,
        max_players: None,
        group_size: row.try_get("group_size")?,
        status: row.try_get("status")?,
        players: row.try_get("players")?,
        matches: row.try_get("matches")?,
        player_groups: row.try_get("player_groups")?,
        created_at: row.try_get("created_at")?,
    })
}

async fn update_record(
    conn: &mut sqlx::SqliteConnection,
    record: &TournamentRecord,
) -> StorageResult<()> {
    let result = sqlx::query(
        "UPDATE tournaments
         SET name = ?, owner_id = ?, capacity = ?, group_size = ?, status = ?,
             players = ?, matches = ?, player_groups = ?
         WHERE id = ?",
    )
    .bind(&record.name)
    .bind(&record.owner_id)
    .bind(record.capacity)
    .bind(record.group_size)
    .bind(&record.status)
    .bind(&record.players)
    .bind(&record.matches)
    .bind(&record.player_groups)
    .bind(record.id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::NotFound(record.id));
    }
    Ok(())
}

async fn fetch_rating(
    conn: &mut sqlx::SqliteConnection,
    participant_id: &str,
) -> StorageResult<Option<f64>> {
    let rating = sqlx::query_scalar::<_, f64>("SELECT rating FROM ratings WHERE user_id = ?")
        .bind(participant_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(rating)
}

async fn upsert_rating(
    conn: &mut sqlx::SqliteConnection,
    participant_id: &str,
    rating: f64,
) -> StorageResult<()> {
    sqlx::query(
        "INSERT INTO ratings (user_id, rating) VALUES (?, ?)
         ON CONFLICT(user_id) DO UPDATE SET rating = excluded.rating",
    )
    .bind(participant_id)
    .bind(rating)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[async_trait]
impl TournamentRepository for SqliteTournamentRepository {
    async fn create(&self, draft: &Tournament) -> StorageResult<Tournament> {
        let id = self.insert_record(&codec::encode(draft)?).await?;
        info!("Created tournament {id} ({})", draft.name);

        let mut created = draft.clone();
        created.id = id;
        Ok(created)
    }

    async fn load(&self, id: TournamentId) -> StorageResult<Tournament> {
        let record = self.fetch_record(id).await?;
        Ok(codec::decode(&record)?.tournament)
    }

    async fn latest(&self) -> StorageResult<Option<Tournament>> {
        let row = sqlx::query(&format!("{SELECT_TOURNAMENT} ORDER BY id DESC LIMIT 1"))
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(codec::decode(&record_from_row(&row)?)?.tournament)),
            None => Ok(None),
        }
    }

    async fn save(&self, tournament: &Tournament) -> StorageResult<()> {
        let record = codec::encode(tournament)?;
        let mut conn = self.pool.acquire().await?;
        update_record(&mut conn, &record).await
    }

    async fn export(&self, id: TournamentId) -> StorageResult<String> {
        let record = self.fetch_record(id).await?;
        Ok(serde_json::to_string_pretty(&record)?)
    }

    async fn import(&self, json: &str) -> StorageResult<Tournament> {
        let record: TournamentRecord = serde_json::from_str(json)?;
        let mut tournament = codec::decode(&record)?.tournament;

        tournament.id = self.insert_record(&codec::encode(&tournament)?).await?;
        info!(
            "Imported tournament {} as {} ({})",
            record.id, tournament.id, tournament.name
        );
        Ok(tournament)
    }

    async fn migrate_rosters(&self) -> StorageResult<usize> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query(SELECT_TOURNAMENT).fetch_all(&mut *tx).await?;
        let mut migrated = 0;
        for row in &rows {
            let decoded = codec::decode(&record_from_row(row)?)?;
            if decoded.upgraded {
                update_record(&mut tx, &codec::encode(&decoded.tournament)?).await?;
                migrated += 1;
            }
        }

        tx.commit().await?;
        info!("Migrated {migrated} of {} tournaments", rows.len());
        Ok(migrated)
    }
}

#[async_trait]
impl RatingRepository for SqliteTournamentRepository {
    async fn load_ratings(&self, participant_ids: &[&str]) -> StorageResult<RatingBook> {
        let mut conn = self.pool.acquire().await?;
        let mut book = RatingBook::new();
        for &participant_id in participant_ids {
            if let Some(rating) = fetch_rating(&mut conn, participant_id).await? {
                book = book.with_rating(participant_id, rating);
            }
        }
        Ok(book)
    }

    async fn save_ratings(&self, book: &RatingBook) -> StorageResult<usize> {
        let changed = book.changed();
        let mut tx = self.pool.begin().await?;
        for (participant_id, rating) in &changed {
            upsert_rating(&mut tx, participant_id, *rating).await?;
        }
        tx.commit().await?;
        Ok(changed.len())
    }

    async fn leaderboard(&self, limit: usize) -> StorageResult<Vec<(ParticipantId, f64)>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            "SELECT user_id, rating FROM ratings ORDER BY rating DESC, user_id ASC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| Ok((r.try_get("user_id")?, r.try_get("rating")?)))
            .collect()
    }
}

/// Mock implementation for testing
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Keeps encoded rows so codec behavior matches the SQLite store
    pub struct MockTournamentRepository {
        records: Arc<Mutex<HashMap<TournamentId, TournamentRecord>>>,
        ratings: Arc<Mutex<HashMap<ParticipantId, f64>>>,
        next_id: Arc<Mutex<TournamentId>>,
    }

    impl Default for MockTournamentRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockTournamentRepository {
        pub fn new() -> Self {
            Self {
                records: Arc::new(Mutex::new(HashMap::new())),
                ratings: Arc::new(Mutex::new(HashMap::new())),
                next_id: Arc::new(Mutex::new(1)),
            }
        }

        pub fn with_record(self, record: TournamentRecord) -> Self {
            {
                let mut next_id = self.next_id.lock().unwrap();
                *next_id = (*next_id).max(record.id + 1);
            }
            self.records.lock().unwrap().insert(record.id, record);
            self
        }

        fn insert(&self, mut record: TournamentRecord) -> TournamentId {
            let mut next_id = self.next_id.lock().unwrap();
            let id = *next_id;
            *next_id += 1;

            record.id = id;
            self.records.lock().unwrap().insert(id, record);
            id
        }

        fn record(&self, id: TournamentId) -> StorageResult<TournamentRecord> {
            self.records
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .ok_or(StorageError::NotFound(id))
        }
    }

    #[async_trait]
    impl TournamentRepository for MockTournamentRepository {
        async fn create(&self, draft: &Tournament) -> StorageResult<Tournament> {
            let mut created = draft.clone();
            created.id = self.insert(codec::encode(draft)?);
            Ok(created)
        }

        async fn load(&self, id: TournamentId) -> StorageResult<Tournament> {
            Ok(codec::decode(&self.record(id)?)?.tournament)
        }

        async fn latest(&self) -> StorageResult<Option<Tournament>> {
            let latest = self.records.lock().unwrap().values().max_by_key(|r| r.id).cloned();
            match latest {
                Some(record) => Ok(Some(codec::decode(&record)?.tournament)),
                None => Ok(None),
            }
        }

        async fn save(&self, tournament: &Tournament) -> StorageResult<()> {
            let record = codec::encode(tournament)?;
            let mut records = self.records.lock().unwrap();
            match records.get_mut(&tournament.id) {
                Some(slot) => {
                    *slot = record;
                    Ok(())
                }
                None => Err(StorageError::NotFound(tournament.id)),
            }
        }

        async fn export(&self, id: TournamentId) -> StorageResult<String> {
            Ok(serde_json::to_string_pretty(&self.record(id)?)?)
        }

        async fn import(&self, json: &str) -> StorageResult<Tournament> {
            let record: TournamentRecord = serde_json::from_str(json)?;
            let mut tournament = codec::decode(&record)?.tournament;
            tournament.id = self.insert(codec::encode(&tournament)?);
            Ok(tournament)
        }

        async fn migrate_rosters(&self) -> StorageResult<usize> {
            let mut records = self.records.lock().unwrap();
            let mut migrated = 0;
            for record in records.values_mut() {
                let decoded = codec::decode(record)?;
                if decoded.upgraded {
                    *record = codec::encode(&decoded.tournament)?;
                    migrated += 1;
                }
            }
            Ok(migrated)
        }
    }

    #[async_trait]
    impl RatingRepository for MockTournamentRepository {
        async fn load_ratings(&self, participant_ids: &[&str]) -> StorageResult<RatingBook> {
            let ratings = self.ratings.lock().unwrap();
            Ok(participant_ids
                .iter()
                .filter_map(|&id| ratings.get(id).map(|r| (id.to_string(), *r)))
                .collect())
        }

        async fn save_ratings(&self, book: &RatingBook) -> StorageResult<usize> {
            let changed = book.changed();
            let mut ratings = self.ratings.lock().unwrap();
            for (id, rating) in &changed {
                ratings.insert(id.clone(), *rating);
            }
            Ok(changed.len())
        }

        async fn leaderboard(&self, limit: usize) -> StorageResult<Vec<(ParticipantId, f64)>> {
            let book: RatingBook = self
                .ratings
                .lock()
                .unwrap()
                .iter()
                .map(|(id, r)| (id.clone(), *r))
                .collect();
            Ok(book.leaderboard().into_iter().take(limit).collect())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::rating::RatingStore;
        use crate::tournament::{TournamentConfig, TournamentStatus};
        use chrono::Utc;

        fn draft(name: &str) -> Tournament {
            Tournament::new(0, TournamentConfig::new(name, "owner"), Utc::now()).unwrap()
        }

        #[tokio::test]
        async fn test_mock_create_assigns_ids() {
            let repo = MockTournamentRepository::new();

            let first = repo.create(&draft("First")).await.unwrap();
            let second = repo.create(&draft("Second")).await.unwrap();

            assert_eq!(first.id, 1);
            assert_eq!(second.id, 2);
            assert_eq!(repo.latest().await.unwrap().unwrap().name, "Second");
        }

        #[tokio::test]
        async fn test_mock_save_and_load() {
            let repo = MockTournamentRepository::new();
            let mut t = repo.create(&draft("Cup")).await.unwrap();

            t.join("alice", Utc::now()).unwrap();
            t.set_lock(true);
            repo.save(&t).await.unwrap();

            let loaded = repo.load(t.id).await.unwrap();
            assert_eq!(loaded.status, TournamentStatus::Locked);
            assert!(loaded.is_registered("alice"));
        }

        #[tokio::test]
        async fn test_mock_missing_tournament() {
            let repo = MockTournamentRepository::new();
            assert!(matches!(repo.load(7).await, Err(StorageError::NotFound(7))));
            assert!(repo.latest().await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_mock_export_import_gets_new_id() {
            let repo = MockTournamentRepository::new();
            let original = repo.create(&draft("Exported")).await.unwrap();

            let json = repo.export(original.id).await.unwrap();
            let imported = repo.import(&json).await.unwrap();

            assert_ne!(imported.id, original.id);
            assert_eq!(imported.name, "Exported");
        }

        #[tokio::test]
        async fn test_mock_migrate_counts_legacy_rows() {
            let legacy = TournamentRecord {
                id: 4,
                name: "Legacy".to_string(),
                owner_id: None,
                capacity: Some(8),
                max_players: None,
                group_size: None,
                status: Some("open".to_string()),
                players: Some(r#"["u1", "u2"]"#.to_string()),
                matches: None,
                player_groups: None,
                created_at: Some(1_700_000_000),
            };
            let repo = MockTournamentRepository::new().with_record(legacy);
            repo.create(&draft("Current")).await.unwrap();

            assert_eq!(repo.migrate_rosters().await.unwrap(), 1);
            assert_eq!(repo.migrate_rosters().await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_mock_ratings_round_trip() {
            let repo = MockTournamentRepository::new();
            let mut book = repo.load_ratings(&["a", "b"]).await.unwrap();
            assert!(book.is_empty());

            book.upsert("a", 1216.0);
            book.upsert("b", 1184.0);
            assert_eq!(repo.save_ratings(&book).await.unwrap(), 2);

            let top = repo.leaderboard(1).await.unwrap();
            assert_eq!(top, vec![("a".to_string(), 1216.0)]);
        }
    }
}
