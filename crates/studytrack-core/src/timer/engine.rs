//! Timer engine implementation.
//!
//! The timer engine is a monotonic-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()` periodically.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!         Expired -> Running (next mode) | Idle (reset)
//! ```
//!
//! Elapsed focus time collects in an accumulator that is committed to the
//! [`SessionSink`] on natural expiry, on `reset`, and on teardown (including
//! drop). Whole minutes are committed; a sub-minute remainder is dropped.
//! The accumulator is zeroed before each commit attempt, so no span can be
//! committed twice even if the sink fails.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(&mut store, TimerSettings::default());
//! engine.start(TimerMode::Focus, 25, Some("math".into()))?;
//! // In a loop:
//! engine.tick()?; // Returns Some(Event::TimerExpired) when the period ends
//! ```

use std::mem;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::clock::{Clock, MonotonicClock};
use super::mode::{minutes_to_ms, TimerMode, TimerSettings};
use crate::error::{Result, TimerError};
use crate::events::Event;
use crate::format;
use crate::storage::StudySession;

const MS_PER_MINUTE: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Expired,
}

/// Where completed study time goes.
pub trait SessionSink {
    fn commit_session(&mut self, subject_id: &str, minutes: u32) -> Result<StudySession>;
}

impl<S: SessionSink + ?Sized> SessionSink for &mut S {
    fn commit_session(&mut self, subject_id: &str, minutes: u32) -> Result<StudySession> {
        (**self).commit_session(subject_id, minutes)
    }
}

/// Handle for the single pending tick.
///
/// Arming a new tick or any state transition invalidates older tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickToken(u64);

type CommitListener = Box<dyn FnMut(&StudySession)>;

/// Core timer engine.
///
/// Operates on clock deltas -- no internal thread.
pub struct TimerEngine<S: SessionSink, C: Clock = MonotonicClock> {
    sink: S,
    clock: C,
    settings: TimerSettings,
    state: TimerState,
    mode: TimerMode,
    subject_id: Option<String>,
    /// Configured length of the current period.
    duration_ms: u64,
    remaining_ms: u64,
    /// Focus time not yet committed.
    accumulated_ms: u64,
    /// Clock reading at start/resume or the last tick.
    last_tick_ms: Option<u64>,
    completed_focus: u32,
    tick_generation: u64,
    armed_tick: Option<u64>,
    listeners: Vec<CommitListener>,
}

impl<S: SessionSink> TimerEngine<S, MonotonicClock> {
    pub fn new(sink: S, settings: TimerSettings) -> Self {
        Self::with_clock(sink, settings, MonotonicClock::new())
    }
}

impl<S: SessionSink, C: Clock> TimerEngine<S, C> {
    pub fn with_clock(sink: S, settings: TimerSettings, clock: C) -> Self {
        let duration_ms = settings.duration_ms(TimerMode::Focus);
        Self {
            sink,
            clock,
            settings,
            state: TimerState::Idle,
            mode: TimerMode::Focus,
            subject_id: None,
            duration_ms,
            remaining_ms: duration_ms,
            accumulated_ms: 0,
            last_tick_ms: None,
            completed_focus: 0,
            tick_generation: 0,
            armed_tick: None,
            listeners: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn subject_id(&self) -> Option<&str> {
        self.subject_id.as_deref()
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn total_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    /// Whole seconds left, rounded up so the display reaches 0 only at expiry.
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_ms.div_ceil(1000)
    }

    pub fn accumulated_ms(&self) -> u64 {
        self.accumulated_ms
    }

    pub fn accumulated_secs(&self) -> u64 {
        self.accumulated_ms / 1000
    }

    /// Focus periods that ran to expiry since the engine was created.
    pub fn completed_focus(&self) -> u32 {
        self.completed_focus
    }

    /// 0.0 .. 100.0 progress within the current period.
    pub fn progress_pct(&self) -> f64 {
        let elapsed = self.duration_ms.saturating_sub(self.remaining_ms);
        format::progress_pct(elapsed as f64, self.duration_ms as f64)
    }

    pub fn has_pending_tick(&self) -> bool {
        self.armed_tick.is_some()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            mode: self.mode,
            subject_id: self.subject_id.clone(),
            remaining_ms: self.remaining_ms,
            total_ms: self.duration_ms,
            accumulated_ms: self.accumulated_ms,
            completed_focus: self.completed_focus,
            progress_pct: self.progress_pct(),
            at: Utc::now(),
        }
    }

    /// Register a callback fired once per committed session.
    pub fn on_session_committed<F>(&mut self, listener: F)
    where
        F: FnMut(&StudySession) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a period from `Idle` or `Expired`.
    ///
    /// `subject_id` of `None` keeps the current subject. Returns `Ok(None)`
    /// if the timer is already running or paused.
    ///
    /// # Errors
    /// `TimerError::NoSubjectSelected` for a focus period without a subject,
    /// `TimerError::InvalidDuration` for a zero duration. State is unchanged.
    pub fn start(
        &mut self,
        mode: TimerMode,
        duration_minutes: u32,
        subject_id: Option<String>,
    ) -> Result<Option<Event>> {
        match self.state {
            TimerState::Running | TimerState::Paused => return Ok(None),
            TimerState::Idle | TimerState::Expired => {}
        }
        if duration_minutes == 0 {
            return Err(TimerError::InvalidDuration(duration_minutes).into());
        }
        let subject_id = subject_id
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.subject_id.clone());
        if mode == TimerMode::Focus && subject_id.is_none() {
            return Err(TimerError::NoSubjectSelected.into());
        }

        self.supersede_tick();
        self.mode = mode;
        self.subject_id = subject_id;
        self.duration_ms = minutes_to_ms(duration_minutes);
        self.remaining_ms = self.duration_ms;
        self.last_tick_ms = Some(self.clock.now_ms());
        self.state = TimerState::Running;
        debug!(?mode, duration_minutes, subject = ?self.subject_id, "timer started");

        Ok(Some(Event::TimerStarted {
            mode,
            subject_id: self.subject_id.clone(),
            duration_secs: self.duration_ms / 1000,
            at: Utc::now(),
        }))
    }

    /// Start the mode chosen at the last expiry with its configured duration.
    pub fn start_next(&mut self) -> Result<Option<Event>> {
        let minutes = self.settings.minutes_for(self.mode);
        self.start(self.mode, minutes, None)
    }

    /// Stop the clock, keeping elapsed focus time in the accumulator.
    ///
    /// If the period already ran out, this expires it instead.
    pub fn pause(&mut self) -> Result<Option<Event>> {
        if self.state != TimerState::Running {
            return Ok(None);
        }
        self.flush_elapsed();
        if self.remaining_ms == 0 {
            return self.expire().map(Some);
        }

        self.supersede_tick();
        self.state = TimerState::Paused;
        self.last_tick_ms = None;
        debug!(accumulated_ms = self.accumulated_ms, "timer paused");
        Ok(Some(Event::TimerPaused {
            remaining_ms: self.remaining_ms,
            accumulated_ms: self.accumulated_ms,
            at: Utc::now(),
        }))
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.state != TimerState::Paused {
            return None;
        }
        self.supersede_tick();
        self.state = TimerState::Running;
        self.last_tick_ms = Some(self.clock.now_ms());
        Some(Event::TimerResumed {
            remaining_ms: self.remaining_ms,
            at: Utc::now(),
        })
    }

    /// Return to `Idle`, committing accumulated focus time first.
    ///
    /// `new_duration_minutes` replaces the period length; otherwise the
    /// current one is restored.
    pub fn reset(&mut self, new_duration_minutes: Option<u32>) -> Result<Event> {
        if new_duration_minutes == Some(0) {
            return Err(TimerError::InvalidDuration(0).into());
        }
        if self.state == TimerState::Running {
            self.flush_elapsed();
        }
        let commit = self.flush_accumulator();

        self.supersede_tick();
        self.state = TimerState::Idle;
        self.last_tick_ms = None;
        if let Some(minutes) = new_duration_minutes {
            self.duration_ms = minutes_to_ms(minutes);
        }
        self.remaining_ms = self.duration_ms;

        let committed = commit?;
        Ok(Event::TimerReset {
            mode: self.mode,
            duration_secs: self.duration_ms / 1000,
            committed,
            at: Utc::now(),
        })
    }

    /// Call periodically. Returns `Some(Event::TimerExpired)` when the period ends.
    pub fn tick(&mut self) -> Result<Option<Event>> {
        if self.state != TimerState::Running {
            return Ok(None);
        }
        self.flush_elapsed();
        if self.remaining_ms == 0 {
            return self.expire().map(Some);
        }
        Ok(None)
    }

    /// Arm the next tick, superseding any outstanding token.
    /// Returns `None` unless the timer is running.
    pub fn arm_tick(&mut self) -> Option<TickToken> {
        if self.state != TimerState::Running {
            return None;
        }
        self.tick_generation += 1;
        self.armed_tick = Some(self.tick_generation);
        Some(TickToken(self.tick_generation))
    }

    /// Deliver an armed tick. Stale tokens are ignored.
    pub fn on_tick(&mut self, token: TickToken) -> Result<Option<Event>> {
        if self.armed_tick != Some(token.0) {
            debug!(token = token.0, "stale tick ignored");
            return Ok(None);
        }
        self.armed_tick = None;
        self.tick()
    }

    /// Stop everything and commit accumulated focus time.
    ///
    /// Also runs on drop; calling it explicitly surfaces commit errors.
    pub fn teardown(&mut self) -> Result<Option<StudySession>> {
        if self.state == TimerState::Running {
            self.flush_elapsed();
        }
        self.supersede_tick();
        self.last_tick_ms = None;
        if matches!(self.state, TimerState::Running | TimerState::Paused) {
            self.state = TimerState::Idle;
            self.remaining_ms = self.duration_ms;
        }
        self.flush_accumulator()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn supersede_tick(&mut self) {
        self.armed_tick = None;
    }

    fn flush_elapsed(&mut self) {
        if let Some(last) = self.last_tick_ms {
            let now = self.clock.now_ms();
            let elapsed = now.saturating_sub(last);
            self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
            if !self.mode.is_break() {
                self.accumulated_ms = self.accumulated_ms.saturating_add(elapsed);
            }
            self.last_tick_ms = Some(now);
        }
    }

    fn expire(&mut self) -> Result<Event> {
        let expired = self.mode;
        let commit = self.flush_accumulator();

        if !expired.is_break() {
            self.completed_focus += 1;
        }
        let next = self.settings.next_mode(expired, self.completed_focus);

        self.supersede_tick();
        self.state = TimerState::Expired;
        self.last_tick_ms = None;
        self.mode = next;
        self.duration_ms = self.settings.duration_ms(next);
        self.remaining_ms = self.duration_ms;
        debug!(?expired, ?next, completed_focus = self.completed_focus, "timer expired");

        let committed = commit?;
        Ok(Event::TimerExpired {
            mode: expired,
            next_mode: next,
            completed_focus: self.completed_focus,
            committed,
            at: Utc::now(),
        })
    }

    fn flush_accumulator(&mut self) -> Result<Option<StudySession>> {
        let accumulated = mem::take(&mut self.accumulated_ms);
        let minutes = accumulated / MS_PER_MINUTE;
        if minutes == 0 {
            if accumulated > 0 {
                debug!(accumulated_ms = accumulated, "sub-minute study time dropped");
            }
            return Ok(None);
        }
        let Some(subject_id) = self.subject_id.clone() else {
            warn!(minutes, "no subject selected, study time discarded");
            return Ok(None);
        };

        let minutes = u32::try_from(minutes).unwrap_or(u32::MAX);
        let session = self.sink.commit_session(&subject_id, minutes)?;
        for listener in &mut self.listeners {
            listener(&session);
        }
        info!(subject = %subject_id, minutes, "study session committed");
        Ok(Some(session))
    }
}

impl<S: SessionSink, C: Clock> Drop for TimerEngine<S, C> {
    fn drop(&mut self) {
        if let Err(e) = self.teardown() {
            warn!(error = %e, "failed to save study time on teardown");
        }
    }
}
