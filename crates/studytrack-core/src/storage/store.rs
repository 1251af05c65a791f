//! Study store: subjects, goals, sessions and the aggregates derived from them.
//!
//! Every mutation keeps the aggregates consistent on its own. The session
//! list is the source of truth: `record_session` appends the session before
//! touching any aggregate, and [`StudyStore::rebuild_aggregates`] can replay
//! the list if a fan-out was interrupted.
//!
//! Reads never fail. A missing key yields its default and an undecodable
//! blob is logged and treated as empty; the next write replaces it.

use chrono::{DateTime, Local, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::backend::KvBackend;
use super::keys;
use super::models::{
    Aggregates, DayTotal, SessionStats, StudyGoal, StudySession, Subject, SubjectTotal, WeekTotal,
};
use super::stats;
use super::streak;
use crate::error::{Result, ValidationError};
use crate::timer::SessionSink;

const SLUG_MAX_LEN: usize = 30;

pub struct StudyStore<B> {
    backend: B,
}

impl<B: KvBackend> StudyStore<B> {
    /// Wrap a backend, running its init step.
    pub fn new(mut backend: B) -> Result<Self> {
        backend.init()?;
        Ok(Self { backend })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    // ── Subjects ─────────────────────────────────────────────────────

    /// Current subjects. A store that has never held subjects is seeded with
    /// [`Subject::defaults`] and the seed is persisted before returning.
    pub fn list_subjects(&mut self) -> Vec<Subject> {
        match self.backend.get(keys::SUBJECTS) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(subjects) => return subjects,
                Err(e) => warn!(error = %e, "subjects blob is corrupted, re-seeding defaults"),
            },
            Ok(None) => info!("seeding default subjects"),
            Err(e) => {
                warn!(error = %e, "subjects unreadable, using defaults");
                return Subject::defaults();
            }
        }

        let seed = Subject::defaults();
        if let Err(e) = self.write_json(keys::SUBJECTS, &seed) {
            warn!(error = %e, "failed to persist default subjects");
        }
        seed
    }

    pub fn get_subject(&mut self, id: &str) -> Option<Subject> {
        self.list_subjects().into_iter().find(|s| s.id == id)
    }

    /// Add a subject with a freshly generated id.
    ///
    /// # Errors
    /// `ValidationError::EmptyName` for a blank name, or a storage error.
    pub fn add_subject(&mut self, name: &str, color: &str) -> Result<Subject> {
        let name = validate_name(name)?;
        let mut subjects = self.list_subjects();
        let subject = Subject {
            id: generate_subject_id(name, &subjects),
            name: name.to_string(),
            color: color.to_string(),
        };
        subjects.push(subject.clone());
        self.write_json(keys::SUBJECTS, &subjects)?;
        info!(id = %subject.id, "subject added");
        Ok(subject)
    }

    /// Replace name and color of a subject in place.
    ///
    /// Returns `Ok(None)` without writing if no subject has this id.
    pub fn update_subject(&mut self, id: &str, name: &str, color: &str) -> Result<Option<Subject>> {
        let name = validate_name(name)?;
        let mut subjects = self.list_subjects();
        let Some(subject) = subjects.iter_mut().find(|s| s.id == id) else {
            debug!(id, "update of unknown subject ignored");
            return Ok(None);
        };
        subject.name = name.to_string();
        subject.color = color.to_string();
        let updated = subject.clone();
        self.write_json(keys::SUBJECTS, &subjects)?;
        Ok(Some(updated))
    }

    /// Remove a subject and every goal that references it.
    /// Sessions of the subject are kept as history.
    pub fn delete_subject(&mut self, id: &str) -> Result<()> {
        let mut subjects = self.list_subjects();
        subjects.retain(|s| s.id != id);
        self.write_json(keys::SUBJECTS, &subjects)?;

        let mut goals = self.list_goals();
        let before = goals.len();
        goals.retain(|g| g.subject_id != id);
        if goals.len() != before {
            self.write_json(keys::GOALS, &goals)?;
        }
        info!(id, goals_removed = before - goals.len(), "subject deleted");
        Ok(())
    }

    // ── Goals ────────────────────────────────────────────────────────

    pub fn list_goals(&self) -> Vec<StudyGoal> {
        self.read_json(keys::GOALS).unwrap_or_default()
    }

    pub fn add_goal(&mut self, subject_id: &str, target_hours: f64, weekly_target: bool) -> Result<StudyGoal> {
        validate_target(target_hours)?;
        let goal = StudyGoal {
            id: Uuid::new_v4().to_string(),
            subject_id: subject_id.to_string(),
            target_hours,
            weekly_target,
            completed_minutes: 0,
            created_at: Utc::now(),
        };
        let mut goals = self.list_goals();
        goals.push(goal.clone());
        self.write_json(keys::GOALS, &goals)?;
        Ok(goal)
    }

    /// Replace a goal by id.
    ///
    /// Progress and creation time stay as stored: they only move through
    /// recorded sessions. Returns `Ok(None)` if the id is unknown.
    pub fn update_goal(&mut self, goal: &StudyGoal) -> Result<Option<StudyGoal>> {
        validate_target(goal.target_hours)?;
        let mut goals = self.list_goals();
        let Some(existing) = goals.iter_mut().find(|g| g.id == goal.id) else {
            debug!(id = %goal.id, "update of unknown goal ignored");
            return Ok(None);
        };
        existing.subject_id = goal.subject_id.clone();
        existing.target_hours = goal.target_hours;
        existing.weekly_target = goal.weekly_target;
        let updated = existing.clone();
        self.write_json(keys::GOALS, &goals)?;
        Ok(Some(updated))
    }

    /// Returns whether a goal was removed.
    pub fn delete_goal(&mut self, id: &str) -> Result<bool> {
        let mut goals = self.list_goals();
        let before = goals.len();
        goals.retain(|g| g.id != id);
        if goals.len() == before {
            return Ok(false);
        }
        self.write_json(keys::GOALS, &goals)?;
        Ok(true)
    }

    // ── Sessions ─────────────────────────────────────────────────────

    pub fn list_sessions(&self) -> Vec<StudySession> {
        self.read_json(keys::SESSIONS).unwrap_or_default()
    }

    /// Record completed study time now. See [`Self::record_session_at`].
    pub fn record_session(&mut self, subject_id: &str, duration_minutes: i64) -> Result<StudySession> {
        self.record_session_at(subject_id, duration_minutes, Local::now())
    }

    /// Record completed study time at `at`.
    ///
    /// In order: append the session, add to the total, advance the streak,
    /// add to every goal of the subject that existed at `at`.
    ///
    /// # Errors
    /// `ValidationError` for a non-positive duration (nothing is written),
    /// or a storage error from any of the writes.
    pub fn record_session_at(
        &mut self,
        subject_id: &str,
        duration_minutes: i64,
        at: DateTime<Local>,
    ) -> Result<StudySession> {
        if duration_minutes <= 0 {
            return Err(ValidationError::NonPositiveDuration(duration_minutes).into());
        }
        let minutes = u32::try_from(duration_minutes)
            .map_err(|_| ValidationError::DurationTooLarge(duration_minutes))?;

        let session = StudySession {
            id: Uuid::new_v4().to_string(),
            subject_id: subject_id.to_string(),
            duration_minutes: minutes,
            date: at.with_timezone(&Utc),
        };

        let mut sessions = self.list_sessions();
        sessions.push(session.clone());
        self.write_json(keys::SESSIONS, &sessions)?;

        let total = saturating_credit(
            self.get_total_study_minutes(),
            minutes,
            keys::TOTAL_STUDY_MINUTES,
        );
        self.write_json(keys::TOTAL_STUDY_MINUTES, &total)?;

        self.update_streak(at)?;
        self.add_goal_progress(&session)?;

        info!(
            subject = subject_id,
            minutes,
            total_minutes = total,
            "session recorded"
        );
        Ok(session)
    }

    fn update_streak(&mut self, at: DateTime<Local>) -> Result<()> {
        let today = at.date_naive();
        let last = self.last_study_day();
        let current = self.get_streak();
        let next = streak::next_streak(current, last, today);
        if next != current {
            self.write_json(keys::STREAK, &next)?;
        }
        if last != Some(today) {
            self.backend
                .set(keys::LAST_STUDY_DAY, &streak::format_day(today))?;
        }
        Ok(())
    }

    /// Credit goals of the session's subject created at or before the session,
    /// matching what [`Self::rebuild_aggregates`] counts.
    fn add_goal_progress(&mut self, session: &StudySession) -> Result<()> {
        let mut goals = self.list_goals();
        let mut touched = false;
        for goal in goals
            .iter_mut()
            .filter(|g| g.subject_id == session.subject_id && session.date >= g.created_at)
        {
            goal.completed_minutes =
                saturating_credit(goal.completed_minutes, session.duration_minutes, keys::GOALS);
            touched = true;
        }
        if touched {
            self.write_json(keys::GOALS, &goals)?;
        }
        Ok(())
    }

    // ── Aggregates ───────────────────────────────────────────────────

    pub fn get_total_study_minutes(&self) -> u64 {
        self.read_json(keys::TOTAL_STUDY_MINUTES).unwrap_or(0)
    }

    pub fn get_streak(&self) -> u32 {
        self.read_json(keys::STREAK).unwrap_or(0)
    }

    pub fn last_study_day(&self) -> Option<chrono::NaiveDate> {
        let raw = self.read_raw(keys::LAST_STUDY_DAY)?;
        let day = streak::parse_day(&raw);
        if day.is_none() {
            warn!(raw = %raw, "unparseable last study day ignored");
        }
        day
    }

    pub fn aggregates(&self) -> Aggregates {
        Aggregates {
            total_study_minutes: self.get_total_study_minutes(),
            streak: self.get_streak(),
            last_study_day: self.last_study_day(),
        }
    }

    /// Recompute every aggregate from the session list and persist it.
    ///
    /// Goal progress counts sessions of the goal's subject recorded at or
    /// after the goal was created.
    pub fn rebuild_aggregates(&mut self) -> Result<Aggregates> {
        let sessions = self.list_sessions();

        let total: u64 = sessions.iter().map(|s| u64::from(s.duration_minutes)).sum();
        let (streak_value, last_day) = streak::replay(sessions.iter().map(stats::local_day));

        self.write_json(keys::TOTAL_STUDY_MINUTES, &total)?;
        self.write_json(keys::STREAK, &streak_value)?;
        match last_day {
            Some(day) => self.backend.set(keys::LAST_STUDY_DAY, &streak::format_day(day))?,
            None => self.backend.remove(keys::LAST_STUDY_DAY)?,
        }

        let mut goals = self.list_goals();
        for goal in &mut goals {
            goal.completed_minutes = sessions
                .iter()
                .filter(|s| s.subject_id == goal.subject_id && s.date >= goal.created_at)
                .map(|s| u64::from(s.duration_minutes))
                .sum();
        }
        if !goals.is_empty() {
            self.write_json(keys::GOALS, &goals)?;
        }

        info!(total_minutes = total, streak = streak_value, "aggregates rebuilt");
        Ok(Aggregates {
            total_study_minutes: total,
            streak: streak_value,
            last_study_day: last_day,
        })
    }

    // ── Statistics ───────────────────────────────────────────────────

    pub fn get_session_stats(&self, window_days: u32, subject_id: Option<&str>) -> SessionStats {
        self.session_stats_at(window_days, subject_id, Local::now())
    }

    pub fn session_stats_at(
        &self,
        window_days: u32,
        subject_id: Option<&str>,
        now: DateTime<Local>,
    ) -> SessionStats {
        stats::window_stats(&self.list_sessions(), window_days, subject_id, now.date_naive())
    }

    /// All-time minutes for a subject, including sessions recorded before
    /// the subject was deleted.
    pub fn get_subject_total_time(&self, subject_id: &str) -> u64 {
        stats::subject_total(&self.list_sessions(), subject_id)
    }

    pub fn daily_breakdown_at(&self, days: u32, now: DateTime<Local>) -> Vec<DayTotal> {
        stats::daily_breakdown(&self.list_sessions(), days, now.date_naive())
    }

    pub fn weekly_breakdown_at(&self, weeks: u32, now: DateTime<Local>) -> Vec<WeekTotal> {
        stats::weekly_breakdown(&self.list_sessions(), weeks, now.date_naive())
    }

    pub fn subject_breakdown(&mut self) -> Vec<SubjectTotal> {
        let subjects = self.list_subjects();
        stats::subject_breakdown(&self.list_sessions(), &subjects)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "read failed, using default");
                None
            }
        }
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "corrupted value, using default");
                None
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.backend.set(key, &raw)?;
        Ok(())
    }
}

impl<B: KvBackend> SessionSink for StudyStore<B> {
    fn commit_session(&mut self, subject_id: &str, minutes: u32) -> Result<StudySession> {
        self.record_session(subject_id, i64::from(minutes))
    }
}

/// Stored counters can be corrupted to any decodable value; clamp instead of
/// overflowing after the session was already appended.
fn saturating_credit(current: u64, minutes: u32, key: &str) -> u64 {
    current.checked_add(u64::from(minutes)).unwrap_or_else(|| {
        warn!(key, current, minutes, "stored counter overflowed, clamping");
        u64::MAX
    })
}

fn validate_name(name: &str) -> Result<&str, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed)
}

fn validate_target(target_hours: f64) -> Result<(), ValidationError> {
    if !target_hours.is_finite() || target_hours <= 0.0 {
        return Err(ValidationError::NonPositiveTarget(target_hours));
    }
    Ok(())
}

/// URL-safe slug of `name` plus a random suffix, unique among `existing`.
fn generate_subject_id(name: &str, existing: &[Subject]) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug: String = slug.trim_matches('-').chars().take(SLUG_MAX_LEN).collect();
    let slug = slug.trim_end_matches('-');
    let slug = if slug.is_empty() { "subject" } else { slug };

    loop {
        let suffix = Uuid::new_v4().simple().to_string();
        let id = format!("{slug}-{}", &suffix[..8]);
        if !existing.iter().any(|s| s.id == id) {
            return id;
        }
    }
}
