use clap::Subcommand;

use super::{open_store, print_json, CliResult};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Record completed study time now
    Record {
        /// Subject ID
        subject_id: String,
        /// Duration in minutes
        #[arg(allow_negative_numbers = true)]
        minutes: i64,
    },
    /// List all recorded sessions
    List,
}

pub fn run(action: SessionAction) -> CliResult {
    let mut store = open_store()?;

    match action {
        SessionAction::Record {
            subject_id,
            minutes,
        } => {
            let session = store.record_session(&subject_id, minutes)?;
            print_json(&session)?;
        }
        SessionAction::List => {
            print_json(&store.list_sessions())?;
        }
    }
    Ok(())
}
