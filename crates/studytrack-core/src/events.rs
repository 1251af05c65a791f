use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::StudySession;
use crate::timer::{TimerMode, TimerState};

/// Every timer state change produces an Event.
/// The presentation layer renders them; commits carry the stored session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        subject_id: Option<String>,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_ms: u64,
        accumulated_ms: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// A period ran out. `committed` is set when a focus period was stored.
    TimerExpired {
        mode: TimerMode,
        next_mode: TimerMode,
        completed_focus: u32,
        committed: Option<StudySession>,
        at: DateTime<Utc>,
    },
    /// Timer returned to idle. `committed` holds a salvaged partial session.
    TimerReset {
        mode: TimerMode,
        duration_secs: u64,
        committed: Option<StudySession>,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        mode: TimerMode,
        subject_id: Option<String>,
        remaining_ms: u64,
        total_ms: u64,
        accumulated_ms: u64,
        completed_focus: u32,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
}
