mod backend;
mod config;
pub mod database;
pub mod models;
pub mod stats;
mod store;
pub mod streak;

pub use backend::{KvBackend, MemoryBackend};
pub use config::{Config, StatsConfig, TimerConfig};
pub use database::SqliteBackend;
pub use models::{
    Aggregates, DayTotal, SessionStats, StudyGoal, StudySession, Subject, SubjectTotal, WeekTotal,
};
pub use store::StudyStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// Persisted key names, one per collection or scalar.
pub mod keys {
    pub const SUBJECTS: &str = "subjects";
    pub const GOALS: &str = "studyGoals";
    pub const SESSIONS: &str = "sessions";
    pub const TOTAL_STUDY_MINUTES: &str = "totalStudyMinutes";
    pub const STREAK: &str = "streak";
    pub const LAST_STUDY_DAY: &str = "lastStudyDay";
}

/// Returns the data directory, creating it if needed.
///
/// `STUDYTRACK_DATA_DIR` wins when set. Otherwise `~/.config/studytrack[-dev]/`,
/// where `STUDYTRACK_ENV=dev` selects the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("STUDYTRACK_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("STUDYTRACK_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("studytrack-dev")
            } else {
                base_dir.join("studytrack")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
