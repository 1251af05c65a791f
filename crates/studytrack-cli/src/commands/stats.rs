use chrono::Local;
use clap::Subcommand;
use serde_json::json;
use studytrack_core::storage::stats::{MAX_BREAKDOWN_DAYS, MAX_BREAKDOWN_WEEKS};
use studytrack_core::Config;

use super::{open_store, print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Minutes and session count over the trailing days
    Window {
        /// Window length in days (defaults to `stats.default_window_days`)
        #[arg(long)]
        days: Option<u32>,
        /// Only count this subject
        #[arg(long)]
        subject: Option<String>,
    },
    /// Total minutes, streak and last study day
    Summary,
    /// Minutes per day, oldest first
    Daily {
        #[arg(
            long,
            default_value = "7",
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_BREAKDOWN_DAYS))
        )]
        days: u32,
    },
    /// Minutes per trailing 7-day block, oldest first
    Weekly {
        #[arg(
            long,
            default_value = "4",
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_BREAKDOWN_WEEKS))
        )]
        weeks: u32,
    },
    /// All-time minutes per subject
    Subjects,
    /// Recompute totals, streak and goal progress from the session list
    Rebuild,
}

pub fn run(action: StatsAction) -> CliResult {
    let mut store = open_store()?;

    match action {
        StatsAction::Window { days, subject } => {
            let days = days.unwrap_or_else(|| Config::load_or_default().stats.default_window_days);
            let stats = store.get_session_stats(days, subject.as_deref());
            print_json(&json!({
                "windowDays": days,
                "subjectId": subject,
                "stats": stats,
            }))?;
        }
        StatsAction::Summary => {
            print_json(&store.aggregates())?;
        }
        StatsAction::Daily { days } => {
            print_json(&store.daily_breakdown_at(days, Local::now()))?;
        }
        StatsAction::Weekly { weeks } => {
            print_json(&store.weekly_breakdown_at(weeks, Local::now()))?;
        }
        StatsAction::Subjects => {
            print_json(&store.subject_breakdown())?;
        }
        StatsAction::Rebuild => {
            print_json(&store.rebuild_aggregates()?)?;
        }
    }
    Ok(())
}
