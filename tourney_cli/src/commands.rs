//! Subcommand parsing and execution.
//!
//! Every tournament command loads the target snapshot, runs it through the
//! engine and persists the result inside one repository transaction.

use anyhow::{Context, Error, anyhow, bail};
use chrono::Utc;
use log::info;
use pico_args::Arguments;
use std::path::{Path, PathBuf};

use tourney::db::{RatingRepository, SqliteTournamentRepository, TournamentRepository};
use tourney::pairing::Pairing;
use tourney::tournament::{
    Command, Tournament, TournamentConfig, TournamentEngine, TournamentError, TournamentId,
};

use crate::config::CliConfig;
use crate::render;

const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// A parsed command line
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Create {
        name: String,
        owner: String,
        capacity: Option<usize>,
        group_size: Option<usize>,
    },
    /// An engine command against one tournament; `None` means the latest
    Run {
        id: Option<TournamentId>,
        command: Command,
    },
    Export {
        id: Option<TournamentId>,
        out: Option<PathBuf>,
    },
    Import {
        path: PathBuf,
    },
    Migrate,
    Leaderboard {
        limit: usize,
    },
}

fn participant(pargs: &mut Arguments) -> Result<String, Error> {
    pargs.free_from_str().context("missing participant id")
}

/// Parse the subcommand and its arguments.
///
/// Global flags must already be taken out of `pargs`.
pub fn parse(mut pargs: Arguments) -> Result<Invocation, Error> {
    let subcommand = pargs
        .subcommand()?
        .ok_or_else(|| anyhow!("missing subcommand, see --help"))?;

    let id: Option<TournamentId> = pargs.opt_value_from_str("--id")?;
    let run = |command| Invocation::Run { id, command };

    let invocation = match subcommand.as_str() {
        "create" => {
            let owner = pargs.value_from_str("--owner")?;
            let capacity = pargs.opt_value_from_str("--slots")?;
            let group_size = pargs.opt_value_from_str("--group-size")?;
            let name = pargs.free_from_str().context("missing tournament name")?;
            Invocation::Create {
                name,
                owner,
                capacity,
                group_size,
            }
        }
        "join" => run(Command::Join {
            participant_id: participant(&mut pargs)?,
        }),
        "confirm" => run(Command::Confirm {
            participant_id: participant(&mut pargs)?,
            as_self: true,
        }),
        "force-confirm" => run(Command::ForceConfirm {
            participant_id: participant(&mut pargs)?,
        }),
        "force-unconfirm" => run(Command::Unconfirm {
            participant_id: participant(&mut pargs)?,
        }),
        "leave" => run(Command::Leave {
            participant_id: participant(&mut pargs)?,
        }),
        "promote" => run(Command::PromoteWaitlist),
        "lock" => run(Command::SetLock { locked: true }),
        "unlock" => run(Command::SetLock { locked: false }),
        "start" => run(Command::Start),
        "complete" => run(Command::Complete),
        "bracket" => run(Command::Bracket),
        "info" => run(Command::Summary),
        "swiss" => {
            let round: Option<usize> = pargs.opt_value_from_str("--round")?;
            let results: Option<PathBuf> = pargs.opt_value_from_str("--results")?;
            let prior_results = match results {
                Some(path) => read_prior_results(&path)?,
                None => Vec::new(),
            };
            // Next round after the recorded ones unless given
            let round_index = round.unwrap_or(prior_results.len());
            run(Command::SwissRound {
                round_index,
                prior_results,
            })
        }
        "report" => {
            let score = pargs.opt_value_from_str("--score")?.unwrap_or(1.0);
            let winner_id = pargs.free_from_str().context("missing winner id")?;
            let loser_id = pargs.free_from_str().context("missing loser id")?;
            run(Command::Report {
                winner_id,
                loser_id,
                score,
            })
        }
        "export" => Invocation::Export {
            id,
            out: pargs.opt_value_from_str("--out")?,
        },
        "import" => Invocation::Import {
            path: pargs.free_from_str().context("missing file to import")?,
        },
        "migrate" => Invocation::Migrate,
        "leaderboard" => Invocation::Leaderboard {
            limit: pargs
                .opt_value_from_str("--limit")?
                .unwrap_or(DEFAULT_LEADERBOARD_LIMIT),
        },
        other => bail!("unknown subcommand `{other}`, see --help"),
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        bail!("unexpected arguments: {remaining:?}");
    }

    Ok(invocation)
}

fn read_prior_results(path: &Path) -> Result<Vec<Vec<Pairing>>, Error> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("{} is not a list of rounds", path.display()))
}

/// User-facing form of a rejected command
fn rejected(err: TournamentError) -> Error {
    anyhow!(err.client_message())
}

async fn resolve(
    repo: &SqliteTournamentRepository,
    id: Option<TournamentId>,
) -> Result<TournamentId, Error> {
    match id {
        Some(id) => Ok(id),
        None => repo
            .latest()
            .await?
            .map(|t| t.id)
            .ok_or_else(|| anyhow!("No tournament found. Create one first.")),
    }
}

/// Execute one invocation and return its text output
pub async fn execute(
    invocation: Invocation,
    repo: &SqliteTournamentRepository,
    engine: &mut TournamentEngine,
    config: &CliConfig,
) -> Result<String, Error> {
    match invocation {
        Invocation::Create {
            name,
            owner,
            capacity,
            group_size,
        } => {
            let tournament_config = TournamentConfig::new(name, owner)
                .with_capacity(capacity.unwrap_or(config.default_capacity))
                .with_group_size(group_size.unwrap_or(config.default_group_size));
            let draft = Tournament::new(0, tournament_config, Utc::now()).map_err(rejected)?;
            let created = repo.create(&draft).await?;
            Ok(format!(
                "Created tournament #{}.\n{}",
                created.id,
                render::summary(&created.summary())
            ))
        }
        Invocation::Run { id, command } => {
            let id = resolve(repo, id).await?;
            let rated = command.rated_participants();
            let (tournament, output) = repo
                .apply(id, &rated, |current, book| {
                    engine
                        .handle(current, command, book)
                        .map(|o| (o.tournament, o.output))
                })
                .await?
                .map_err(rejected)?;
            Ok(render::output(&tournament, &output))
        }
        Invocation::Export { id, out } => {
            let id = resolve(repo, id).await?;
            let json = repo.export(id).await?;
            match out {
                Some(path) => {
                    std::fs::write(&path, &json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    Ok(format!("Exported tournament #{id} to {}", path.display()))
                }
                None => Ok(json),
            }
        }
        Invocation::Import { path } => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let imported = repo.import(&json).await?;
            Ok(format!(
                "Imported as tournament #{}.\n{}",
                imported.id,
                render::summary(&imported.summary())
            ))
        }
        Invocation::Migrate => {
            let migrated = repo.migrate_rosters().await?;
            info!("Migration finished: {migrated} rows rewritten");
            Ok(format!("Migrated {migrated} tournament(s)."))
        }
        Invocation::Leaderboard { limit } => {
            let entries = repo.leaderboard(limit).await?;
            Ok(render::leaderboard(&entries))
        }
    }
}
