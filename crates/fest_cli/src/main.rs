//! Festival scoring CLI
//!
//! Inspects an event snapshot and tabulation state exported as JSON:
//! team standings, individual toppers, enrollment validation, summary.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use fest_core::{
    leadership_cardinality, resolve_entries, validate_enrollment, validate_group_shape,
    EventSnapshot, PerformanceType, PointsEngine, TabulationManager, TabulationState, TopperFilter,
};

#[derive(Parser)]
#[command(name = "fest_cli")]
#[command(about = "Inspect festival scoring snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Team leaderboard from declared results
    Standings {
        /// Event snapshot JSON file
        #[arg(long)]
        snapshot: PathBuf,

        /// Tabulation state JSON file
        #[arg(long)]
        state: PathBuf,
    },

    /// Individual toppers across Single items
    Toppers {
        /// Event snapshot JSON file
        #[arg(long)]
        snapshot: PathBuf,

        /// Tabulation state JSON file
        #[arg(long)]
        state: PathBuf,

        /// Restrict to one performance type (on-stage | off-stage)
        #[arg(long)]
        performance: Option<String>,

        /// Restrict to one category id
        #[arg(long)]
        category: Option<String>,

        /// Number of rows to show
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Check every participant's enrollment and each group item's shape
    Validate {
        /// Event snapshot JSON file
        #[arg(long)]
        snapshot: PathBuf,
    },

    /// Declared item, contributing participant and winner-row counts
    Summary {
        /// Event snapshot JSON file
        #[arg(long)]
        snapshot: PathBuf,

        /// Tabulation state JSON file
        #[arg(long)]
        state: PathBuf,
    },
}

fn load_snapshot(path: &Path) -> Result<EventSnapshot> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing snapshot {}", path.display()))
}

fn load_state(path: &Path) -> Result<TabulationState> {
    let data =
        fs::read_to_string(path).with_context(|| format!("reading state {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing state {}", path.display()))
}

fn parse_performance(value: &str) -> Result<PerformanceType> {
    match value {
        "on-stage" | "on_stage" => Ok(PerformanceType::OnStage),
        "off-stage" | "off_stage" => Ok(PerformanceType::OffStage),
        other => bail!("unknown performance type: {}", other),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Standings { snapshot, state } => {
            let snapshot = load_snapshot(&snapshot)?;
            let manager = TabulationManager::from_state(load_state(&state)?);
            let engine = PointsEngine::new(&snapshot, manager.results());

            let standings = engine.team_standings()?;
            if standings.is_empty() {
                println!("No declared results yet.");
                return Ok(());
            }
            println!("{:<4} {:<24} {:>6} {:>6} {:>7}", "#", "Team", "Rank", "Grade", "Total");
            for (index, standing) in standings.iter().enumerate() {
                println!(
                    "{:<4} {:<24} {:>6} {:>6} {:>7}",
                    index + 1,
                    standing.team_name,
                    standing.points.rank_points,
                    standing.points.grade_points,
                    standing.points.total()
                );
            }
        }

        Commands::Toppers { snapshot, state, performance, category, top } => {
            let snapshot = load_snapshot(&snapshot)?;
            let manager = TabulationManager::from_state(load_state(&state)?);
            let engine = PointsEngine::new(&snapshot, manager.results());

            let filter = TopperFilter {
                performance_type: performance.as_deref().map(parse_performance).transpose()?,
                category_id: category,
            };
            let toppers = engine.individual_toppers(&filter, top)?;
            if toppers.is_empty() {
                println!("No individual results match the filter.");
                return Ok(());
            }
            println!(
                "{:<4} {:<24} {:<10} {:>6} {:>6} {:>7}",
                "#", "Participant", "Team", "Rank", "Grade", "Total"
            );
            for (index, row) in toppers.iter().enumerate() {
                println!(
                    "{:<4} {:<24} {:<10} {:>6} {:>6} {:>7}",
                    index + 1,
                    row.participant_name,
                    row.team_id,
                    row.points.rank_points,
                    row.points.grade_points,
                    row.points.total()
                );
            }
        }

        Commands::Validate { snapshot } => {
            let snapshot = load_snapshot(&snapshot)?;
            let mut findings = 0usize;

            for participant in snapshot.participants.values() {
                if let Some(violation) =
                    validate_enrollment(participant, &participant.item_ids, &snapshot)?
                {
                    findings += 1;
                    println!("participant {}: {}", participant.id, violation);
                }
            }

            for item in snapshot.items.values().filter(|item| item.is_group()) {
                let entries = resolve_entries(item, &snapshot)?;
                for violation in validate_group_shape(item, &entries) {
                    findings += 1;
                    println!("item {}: {}", item.id, violation);
                }
                for entry in &entries {
                    let cardinality = leadership_cardinality(entry, &snapshot)?;
                    if !cardinality.is_valid() {
                        findings += 1;
                        println!(
                            "item {}: entry {} has {:?} leadership",
                            item.id,
                            entry.key(),
                            cardinality
                        );
                    }
                }
            }

            if findings == 0 {
                println!("OK: no violations found");
            } else {
                println!("{} violation(s) found", findings);
            }
        }

        Commands::Summary { snapshot, state } => {
            let snapshot = load_snapshot(&snapshot)?;
            let manager = TabulationManager::from_state(load_state(&state)?);
            let engine = PointsEngine::new(&snapshot, manager.results());

            let summary = engine.global_summary();
            println!("Declared items:            {}", summary.declared_items);
            println!("Contributing participants: {}", summary.contributing_participants);
            println!("Winner rows:               {}", summary.winner_rows);
        }
    }

    Ok(())
}
