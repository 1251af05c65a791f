//! # Studytrack Core Library
//!
//! This library provides the core logic for Studytrack, a personal study
//! tracker. All operations are available via the standalone CLI binary; any
//! other front end is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Study Store**: subjects, goals and sessions over a pluggable key/value
//!   backend (SQLite on disk, in-memory for tests). Every mutation keeps the
//!   derived aggregates (total minutes, streak, goal progress) consistent.
//! - **Timer Engine**: a monotonic-clock state machine for focus and break
//!   periods that commits focus time to the store exactly once.
//! - **Config**: TOML-based timer and statistics preferences.
//!
//! ## Key Components
//!
//! - [`StudyStore`]: Persistence and aggregation
//! - [`TimerEngine`]: Core timer state machine
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod format;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, StorageError, TimerError, ValidationError};
pub use events::Event;
pub use storage::{
    Config, KvBackend, MemoryBackend, SessionStats, SqliteBackend, StudyGoal, StudySession,
    StudyStore, Subject,
};
pub use timer::{
    Clock, ManualClock, MonotonicClock, SessionSink, TimerEngine, TimerMode, TimerSettings,
    TimerState,
};
