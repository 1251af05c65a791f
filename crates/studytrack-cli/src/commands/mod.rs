pub mod config;
pub mod goal;
pub mod session;
pub mod stats;
pub mod subject;
pub mod timer;

use serde::Serialize;
use studytrack_core::{SqliteBackend, StudyStore};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub type Store = StudyStore<SqliteBackend>;

/// Open the study store in the data directory.
pub fn open_store() -> Result<Store, Box<dyn std::error::Error>> {
    Ok(StudyStore::new(SqliteBackend::open()?)?)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
