//! Club Matchday CLI
//!
//! 데이터셋 JSON 파일을 로드해서 요약/재계산을 실행하는 운영 도구.
//! Summaries print to stdout; recompute commands can persist the updated
//! dataset back to disk with `--out`.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use cm_core::stats::recalc::{
    recalc_attendance_rating_stats, recalc_player_stats_history_by_attendance, update_seeds,
};
use cm_core::summary::match_summary;
use cm_core::ClubStore;

#[derive(Parser)]
#[command(name = "cm_cli")]
#[command(about = "Run club matchday summaries and stat recomputation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the summary of one match
    Summary {
        /// Dataset JSON file path
        #[arg(long)]
        data: PathBuf,

        /// Match id to summarize
        #[arg(long)]
        match_id: i64,
    },

    /// Recompute rating stats and history for one attendance
    Recalc {
        /// Dataset JSON file path
        #[arg(long)]
        data: PathBuf,

        /// Attendance id to recompute
        #[arg(long)]
        attendance_id: i64,

        /// Reference time (RFC 3339); defaults to the wall clock
        #[arg(long)]
        now: Option<DateTime<Utc>>,

        /// Write the updated dataset here
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Seed default ratings for one rater across one match side
    Seed {
        /// Dataset JSON file path
        #[arg(long)]
        data: PathBuf,

        /// Match side to seed
        #[arg(long)]
        match_club_id: i64,

        /// Rater user id
        #[arg(long)]
        rater_user_id: i64,

        /// Reference time (RFC 3339); defaults to the wall clock
        #[arg(long)]
        now: Option<DateTime<Utc>>,

        /// Write the updated dataset here
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn load_store(path: &PathBuf) -> Result<ClubStore> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse dataset {}", path.display()))
}

fn persist_store(store: &ClubStore, out: Option<&PathBuf>) -> Result<()> {
    if let Some(path) = out {
        let raw = serde_json::to_string_pretty(store)?;
        fs::write(path, raw)
            .with_context(|| format!("failed to write dataset {}", path.display()))?;
        eprintln!("dataset written to {}", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Summary { data, match_id } => {
            let store = load_store(&data)?;
            let summary = match_summary(&store, match_id)
                .with_context(|| format!("failed to summarize match {}", match_id))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Commands::Recalc { data, attendance_id, now, out } => {
            let mut store = load_store(&data)?;
            let now = now.unwrap_or_else(Utc::now);
            let stats = recalc_attendance_rating_stats(&mut store, attendance_id)
                .with_context(|| format!("failed to recompute attendance {}", attendance_id))?;
            recalc_player_stats_history_by_attendance(&mut store, attendance_id, now)
                .with_context(|| format!("failed to recompute history for {}", attendance_id))?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            persist_store(&store, out.as_ref())?;
        }

        Commands::Seed { data, match_club_id, rater_user_id, now, out } => {
            let mut store = load_store(&data)?;
            let now = now.unwrap_or_else(Utc::now);
            update_seeds(&mut store, match_club_id, rater_user_id, now).with_context(|| {
                format!("failed to seed match club {} for user {}", match_club_id, rater_user_id)
            })?;
            println!("{}", serde_json::json!({ "ok": true }));
            persist_store(&store, out.as_ref())?;
        }
    }

    Ok(())
}
