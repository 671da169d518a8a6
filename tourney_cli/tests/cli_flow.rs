//! Integration tests for the CLI command flow
//!
//! Commands are parsed from argument vectors and executed against an
//! in-memory database, the same path `main` takes.

use pico_args::Arguments;
use std::ffi::OsString;
use tourney::db::{Database, DatabaseConfig, SqliteTournamentRepository, TournamentRepository};
use tourney::tournament::{TournamentEngine, TournamentStatus};
use tourney_cli::commands::{self, Invocation};
use tourney_cli::config::CliConfig;

struct Harness {
    _db: Database,
    repo: SqliteTournamentRepository,
    engine: TournamentEngine,
    config: CliConfig,
}

impl Harness {
    async fn new() -> Self {
        let config = CliConfig {
            database: DatabaseConfig::in_memory(),
            default_capacity: 2,
            default_group_size: 1,
            k_factor: 32.0,
        };
        let db = Database::new(&config.database).await.unwrap();
        db.init_schema().await.unwrap();
        Self {
            repo: db.repository(),
            _db: db,
            engine: TournamentEngine::seeded(99),
            config,
        }
    }

    fn parse(line: &str) -> Invocation {
        let args = line.split_whitespace().map(OsString::from).collect();
        commands::parse(Arguments::from_vec(args)).unwrap()
    }

    async fn run(&mut self, line: &str) -> Result<String, anyhow::Error> {
        commands::execute(Self::parse(line), &self.repo, &mut self.engine, &self.config).await
    }
}

#[tokio::test]
async fn test_commands_default_to_latest_tournament() {
    let mut h = Harness::new().await;

    let out = h.run("create --owner org Weekly").await.unwrap();
    assert!(out.contains("Created tournament #1"));
    assert!(out.contains("0/2 confirmed"));

    h.run("join alice").await.unwrap();
    h.run("join bob").await.unwrap();
    h.run("join carol").await.unwrap();
    h.run("confirm alice").await.unwrap();
    h.run("confirm bob").await.unwrap();

    let err = h.run("confirm carol").await.unwrap_err();
    assert_eq!(err.to_string(), "Tournament is full (confirmed slots).");

    let t = h.repo.load(1).await.unwrap();
    assert_eq!(t.confirmed_count(), 2);
    assert!(!t.participant("carol").unwrap().confirmed);
}

#[tokio::test]
async fn test_start_report_and_leaderboard() {
    let mut h = Harness::new().await;
    h.run("create --owner org --slots 4 --group-size 2 Finals").await.unwrap();
    for user in ["a", "b", "c", "d"] {
        h.run(&format!("force-confirm {user}")).await.unwrap();
    }

    let started = h.run("start").await.unwrap();
    assert!(started.contains("Group 1:"));
    assert!(started.contains("Group 2:"));

    let reported = h.run("report c a --score 3").await.unwrap();
    assert!(reported.contains("c: 1200 -> 1216 (+16.0)"));

    let board = h.run("leaderboard --limit 1").await.unwrap();
    assert_eq!(board, "  1. c 1216");

    h.run("complete").await.unwrap();
    let t = h.repo.latest().await.unwrap().unwrap();
    assert_eq!(t.status, TournamentStatus::Completed);
    assert_eq!(t.matches[0].score, 3.0);
}

#[tokio::test]
async fn test_no_tournament_yet() {
    let mut h = Harness::new().await;
    let err = h.run("info").await.unwrap_err();
    assert!(err.to_string().contains("No tournament found"));
}

#[tokio::test]
async fn test_export_then_import_creates_copy() {
    let mut h = Harness::new().await;
    h.run("create --owner org Original").await.unwrap();
    h.run("join zoe").await.unwrap();

    let path = std::env::temp_dir().join(format!("tourney-export-{}.json", std::process::id()));
    let out = h
        .run(&format!("export --id 1 --out {}", path.display()))
        .await
        .unwrap();
    assert!(out.contains("Exported tournament #1"));

    let imported = h.run(&format!("import {}", path.display())).await.unwrap();
    assert!(imported.contains("Imported as tournament #2"));
    std::fs::remove_file(&path).unwrap();

    let copy = h.repo.load(2).await.unwrap();
    assert!(copy.is_registered("zoe"));
}

#[tokio::test]
async fn test_locked_rejects_self_service_join() {
    let mut h = Harness::new().await;
    h.run("create --owner org Closed").await.unwrap();
    h.run("lock").await.unwrap();

    let err = h.run("join late").await.unwrap_err();
    assert!(err.to_string().contains("locked"));

    h.run("unlock").await.unwrap();
    h.run("join late").await.unwrap();
}
