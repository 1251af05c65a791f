use clap::Subcommand;
use serde_json::json;
use studytrack_core::StudyGoal;

use super::{open_store, print_json, CliResult};

#[derive(Subcommand)]
pub enum GoalAction {
    /// List goals with their progress
    List,
    /// Add a goal for a subject
    Add {
        /// Subject ID
        subject_id: String,
        /// Target in hours
        hours: f64,
        /// Weekly instead of daily target
        #[arg(long)]
        weekly: bool,
    },
    /// Delete a goal
    Delete {
        /// Goal ID
        id: String,
    },
}

fn with_progress(goal: &StudyGoal) -> serde_json::Value {
    json!({
        "goal": goal,
        "progressPct": goal.progress_pct(),
        "complete": goal.is_complete(),
    })
}

pub fn run(action: GoalAction) -> CliResult {
    let mut store = open_store()?;

    match action {
        GoalAction::List => {
            let goals: Vec<_> = store.list_goals().iter().map(with_progress).collect();
            print_json(&goals)?;
        }
        GoalAction::Add {
            subject_id,
            hours,
            weekly,
        } => {
            let goal = store.add_goal(&subject_id, hours, weekly)?;
            print_json(&with_progress(&goal))?;
        }
        GoalAction::Delete { id } => {
            let found = store.delete_goal(&id)?;
            print_json(&json!({ "deleted": id, "found": found }))?;
        }
    }
    Ok(())
}
