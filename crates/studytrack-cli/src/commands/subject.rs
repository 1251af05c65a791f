use clap::Subcommand;
use serde_json::json;
use studytrack_core::format::format_clock_hours;

use super::{open_store, print_json, CliResult};

const DEFAULT_COLOR: &str = "study-default";

#[derive(Subcommand)]
pub enum SubjectAction {
    /// List subjects (seeds the defaults on first use)
    List,
    /// Add a subject
    Add {
        /// Display name
        name: String,
        /// Color tag
        #[arg(long, default_value = DEFAULT_COLOR)]
        color: String,
    },
    /// Rename or recolor a subject (prints `null` for an unknown id)
    Update {
        /// Subject ID
        id: String,
        /// New display name
        name: String,
        /// New color tag (keeps the current one if omitted)
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a subject and its goals
    Delete {
        /// Subject ID
        id: String,
    },
    /// All-time study minutes for a subject
    Total {
        /// Subject ID
        id: String,
    },
}

pub fn run(action: SubjectAction) -> CliResult {
    let mut store = open_store()?;

    match action {
        SubjectAction::List => {
            print_json(&store.list_subjects())?;
        }
        SubjectAction::Add { name, color } => {
            let subject = store.add_subject(&name, &color)?;
            print_json(&subject)?;
        }
        SubjectAction::Update { id, name, color } => {
            let color = color
                .or_else(|| store.get_subject(&id).map(|s| s.color))
                .unwrap_or_else(|| DEFAULT_COLOR.to_string());
            print_json(&store.update_subject(&id, &name, &color)?)?;
        }
        SubjectAction::Delete { id } => {
            store.delete_subject(&id)?;
            print_json(&json!({ "deleted": id }))?;
        }
        SubjectAction::Total { id } => {
            let minutes = store.get_subject_total_time(&id);
            print_json(&json!({
                "subjectId": id,
                "totalMinutes": minutes,
                "formatted": format_clock_hours(minutes.saturating_mul(60)),
            }))?;
        }
    }
    Ok(())
}
