//! Tournament registration and pairing CLI.
//!
//! Each invocation runs one command against the configured SQLite database.

use anyhow::{Context, Error};
use log::debug;
use pico_args::Arguments;
use tourney::db::Database;
use tourney::tournament::TournamentEngine;

use tourney_cli::{commands, config::CliConfig, logging};

const HELP: &str = "\
Manage tournament registration, pairing and ratings

USAGE:
  tourney [OPTIONS] <SUBCOMMAND> [ARGS]

SUBCOMMANDS:
  create NAME --owner ID [--slots N] [--group-size N]
                            Create a tournament
  join USER                 Pre-register a participant
  confirm USER              Confirm a pre-registered participant (self-service)
  force-confirm USER        Confirm, registering first if needed (organizer)
  force-unconfirm USER      Release a confirmed slot (organizer)
  leave USER                Remove a participant
  promote                   Confirm the earliest waitlisted participant
  lock | unlock             Close or reopen self-service registration
  start                     Generate groups and start the tournament
  complete                  Mark a running tournament as completed
  bracket                   Show a single-elimination bracket
  swiss [--round N] [--results FILE]
                            Pair a Swiss round from prior results (JSON)
  report WINNER LOSER [--score S]
                            Record a result and update Elo ratings
  info                      Show the tournament summary
  export [--out FILE]       Print or write the stored record as JSON
  import FILE               Create a tournament from exported JSON
  migrate                   Rewrite legacy rosters in the current shape
  leaderboard [--limit N]   Show the highest ratings

OPTIONS:
  --id N                    Tournament id  [default: latest tournament]
  --db-url URL              Database connection string  [default: env DATABASE_URL or sqlite://data/tournaments.db]

FLAGS:
  -h, --help                Print help information

ENVIRONMENT:
  DATABASE_URL              SQLite connection string
  DB_MAX_CONNECTIONS        Connection pool size  [default: 5]
  DB_CONNECTION_TIMEOUT     Acquire timeout in seconds  [default: 10]
  TOURNEY_DEFAULT_SLOTS     Capacity for create without --slots  [default: 16]
  TOURNEY_DEFAULT_GROUP_SIZE
                            Group size for create without --group-size  [default: 1]
  TOURNEY_K_FACTOR          Elo K-factor  [default: 32]
  RUST_LOG                  Log filter  [default: info,sqlx=warn]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    logging::init();

    let db_url: Option<String> = pargs.opt_value_from_str("--db-url")?;
    let config = CliConfig::from_env(db_url);
    config.validate()?;

    let invocation = commands::parse(pargs)?;
    debug!("Running {invocation:?}");

    let db = Database::new(&config.database)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.database_url))?;
    db.init_schema().await.context("Failed to create schema")?;

    let repo = db.repository();
    let mut engine = TournamentEngine::new().with_k_factor(config.k_factor);

    let result = commands::execute(invocation, &repo, &mut engine, &config).await;
    db.close().await;

    println!("{}", result?);
    Ok(())
}
