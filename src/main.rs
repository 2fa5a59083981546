use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peloton_pool::api::state::AppState;
use peloton_pool::config::AppConfig;
use peloton_pool::ingest;
use peloton_pool::models::{ExportSnapshot, StageResult};
use peloton_pool::storage::{
    commit_stages, read_json, read_roster, read_snapshot, read_stage_log, write_export,
    write_json, write_roster, write_snapshot, write_stage_log, StageRecord, StorageConfig,
};
use peloton_pool::tracker::Tracker;

#[derive(Parser)]
#[command(name = "peloton-pool")]
#[command(about = "Fantasy cycling pool tracker: stage scoring, daily wins and rankings")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new race from a roster file
    Init {
        /// Roster JSON file
        roster: PathBuf,

        /// Replace an existing race and its stage log
        #[arg(long)]
        force: bool,
    },

    /// Apply stage result files (or directories of them), all or nothing
    Apply {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Validate and show what would change, without saving
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the pool standings
    Standings {
        #[arg(long)]
        json: bool,
    },

    /// Show all riders with their points
    Riders {
        /// Only drafted riders
        #[arg(long)]
        in_team: bool,

        /// Show at most this many riders
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Show the standings after every stage
    History {
        #[arg(long)]
        json: bool,
    },

    /// Show each participant's rank timeline
    Progression {
        #[arg(long)]
        json: bool,
    },

    /// Show the top three participants of one stage
    Podium { stage: u32 },

    /// Write a snapshot of the race
    Export {
        /// Output file (defaults to a timestamped file in the exports directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Replace the race state with a snapshot
    Import { snapshot: PathBuf },

    /// Rebuild the snapshot from the roster and the stage log
    Rebuild,

    /// Start the API server
    Serve {
        /// Bind address (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },
}

/// Load the race: the saved snapshot if there is one, else replay the stage log.
fn load_tracker(storage: &StorageConfig, config: &AppConfig) -> Result<Tracker> {
    if let Some(snapshot) = read_snapshot(storage)? {
        return Ok(Tracker::from_snapshot(&snapshot, config.scoring.clone())?);
    }

    if !storage.roster_path().exists() {
        bail!(
            "No race found in {:?}; run `peloton-pool init <roster.json>` first",
            storage.data_dir
        );
    }
    rebuild_tracker(storage, config)
}

fn rebuild_tracker(storage: &StorageConfig, config: &AppConfig) -> Result<Tracker> {
    let roster = read_roster(storage).context("Failed to read roster")?;
    let stages: Vec<StageResult> = read_stage_log(storage)?
        .into_iter()
        .map(|record| record.result)
        .collect();

    tracing::info!("Replaying {} logged stages", stages.len());
    Ok(Tracker::replay(
        &roster,
        &stages,
        config.scoring.clone(),
        config.rules.roster_rules(),
    )?)
}

fn read_stage_inputs(paths: &[PathBuf]) -> Result<Vec<StageResult>> {
    let mut stages = Vec::new();
    for path in paths {
        if path.is_dir() {
            stages.extend(ingest::read_stage_dir(path)?);
        } else {
            stages.push(ingest::read_stage_file(path)?);
        }
    }
    Ok(stages)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_standings(tracker: &Tracker) {
    println!("After stage {}", tracker.current_stage());
    let Some(ranking) = tracker.current_ranking() else {
        for p in tracker.participants() {
            println!("  -  {:<24} {:>5}", p.name, 0);
        }
        return;
    };
    for entry in &ranking.entries {
        let wins = tracker
            .state()
            .participant(&entry.name)
            .map(|p| p.daily_wins)
            .unwrap_or(0);
        println!(
            "{:>3}. {:<24} {:>5} pts  (+{:<3}) {} daily win(s)",
            entry.rank, entry.name, entry.total_points, entry.stage_points, wins
        );
    }
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config {:?}", cli.config))?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    init_tracing(&config.log_level, cli.json_logs);
    tracing::info!("Starting peloton-pool v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(config.data_dir.clone());

    match cli.command {
        Commands::Init { roster, force } => {
            if storage.roster_path().exists() && !force {
                bail!(
                    "A race already exists in {:?}; pass --force to replace it",
                    storage.data_dir
                );
            }

            let payload = ingest::read_roster_file(&roster)?;
            let tracker = match Tracker::from_roster(
                &payload,
                config.scoring.clone(),
                config.rules.roster_rules(),
            ) {
                Ok(tracker) => tracker,
                Err(errors) => {
                    for message in errors.messages() {
                        tracing::error!("{}", message);
                    }
                    bail!("Roster rejected: {} issue(s)", errors.len());
                }
            };

            write_roster(&storage, &payload)?;
            write_stage_log(&storage, &[])?;
            write_snapshot(&storage, &tracker.snapshot(Utc::now()))?;
            println!(
                "Race started: {} participants, {} riders",
                tracker.participants().len(),
                tracker.state().riders.len()
            );
        }
        Commands::Apply { paths, dry_run } => {
            let mut tracker = load_tracker(&storage, &config)?;
            let previous = tracker.snapshot(Utc::now());
            let stages = read_stage_inputs(&paths)?;

            let summaries = match tracker.apply_stages(&stages) {
                Ok(summaries) => summaries,
                Err(errors) => {
                    for message in errors.messages() {
                        tracing::error!("{}", message);
                    }
                    bail!("Nothing applied: {} issue(s)", errors.len());
                }
            };

            for summary in &summaries {
                println!(
                    "Stage {:>2}: {} placings, {} jerseys, {} dropouts, {} points",
                    summary.stage,
                    summary.placings,
                    summary.jerseys,
                    summary.dropouts,
                    summary.points_awarded
                );
            }

            if dry_run {
                println!("Dry run: nothing saved");
            } else {
                let records: Vec<StageRecord> = stages.into_iter().map(StageRecord::now).collect();
                commit_stages(&storage, &records, &tracker.snapshot(Utc::now()), &previous)?;
            }
            print_standings(&tracker);
        }
        Commands::Standings { json } => {
            let tracker = load_tracker(&storage, &config)?;
            if json {
                print_json(&tracker.participants())?;
            } else {
                print_standings(&tracker);
            }
        }
        Commands::Riders {
            in_team,
            limit,
            json,
        } => {
            let tracker = load_tracker(&storage, &config)?;
            let riders: Vec<_> = tracker
                .all_riders()
                .iter()
                .filter(|r| !in_team || r.in_team)
                .take(limit.unwrap_or(usize::MAX))
                .collect();

            if json {
                print_json(&riders)?;
            } else {
                for r in riders {
                    println!(
                        "{:<28} {:<20} {:>5} pts  picked by {}  {}",
                        r.name, r.team, r.total_points, r.selected_by, r.status
                    );
                }
            }
        }
        Commands::History { json } => {
            let tracker = load_tracker(&storage, &config)?;
            if json {
                print_json(tracker.ranking_history())?;
            } else {
                for stage in tracker.ranking_history() {
                    let line: Vec<String> = stage
                        .entries
                        .iter()
                        .map(|e| format!("{}. {} ({})", e.rank, e.name, e.total_points))
                        .collect();
                    println!("Stage {:>2}: {}", stage.stage, line.join(", "));
                }
            }
        }
        Commands::Progression { json } => {
            let tracker = load_tracker(&storage, &config)?;
            if json {
                print_json(&tracker.ranking_progression())?;
            } else {
                for p in tracker.ranking_progression() {
                    let ranks: Vec<String> = p.timeline.iter().map(|t| t.rank.to_string()).collect();
                    println!(
                        "{:<24} now {:>2}  best {:>2}  [{}]",
                        p.name,
                        p.current_ranking.map_or("-".to_string(), |r| r.to_string()),
                        p.best_rank().map_or("-".to_string(), |r| r.to_string()),
                        ranks.join(" ")
                    );
                }
            }
        }
        Commands::Podium { stage } => {
            let tracker = load_tracker(&storage, &config)?;
            let Some(podium) = tracker.stage_podium(stage) else {
                bail!("No results loaded for stage {}", stage);
            };
            for entry in podium {
                println!("{}. {} ({} pts)", entry.rank, entry.name, entry.stage_points);
            }
        }
        Commands::Export { output } => {
            let tracker = load_tracker(&storage, &config)?;
            let snapshot = tracker.snapshot(Utc::now());
            let path = match output {
                Some(path) => {
                    write_json(&path, &snapshot)?;
                    path
                }
                None => write_export(&storage, &snapshot)?,
            };
            println!(
                "Exported stage {} snapshot to {}",
                snapshot.current_stage,
                path.display()
            );
        }
        Commands::Import { snapshot } => {
            let parsed: ExportSnapshot = read_json(&snapshot)
                .with_context(|| format!("Failed to read snapshot {:?}", snapshot))?;
            let tracker = Tracker::from_snapshot(&parsed, config.scoring.clone())?;

            write_snapshot(&storage, &tracker.snapshot(parsed.export_date))?;
            if !read_stage_log(&storage)?.is_empty() {
                tracing::warn!("Imported snapshot replaces the race; clearing the stage log");
                write_stage_log(&storage, &[])?;
            }
            println!(
                "Imported snapshot at stage {} ({} participants)",
                tracker.current_stage(),
                tracker.participants().len()
            );
        }
        Commands::Rebuild => {
            let tracker = rebuild_tracker(&storage, &config)?;
            write_snapshot(&storage, &tracker.snapshot(Utc::now()))?;
            println!("Rebuilt race at stage {}", tracker.current_stage());
        }
        Commands::Serve { host, port } => {
            let tracker = load_tracker(&storage, &config)?;
            let state = AppState::new(storage, tracker)
                .with_cors_origin(config.server.cors_origin.clone());
            let app = peloton_pool::api::build_router(state);

            let addr = format!(
                "{}:{}",
                host.unwrap_or(config.server.host),
                port.unwrap_or(config.server.port)
            );
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
