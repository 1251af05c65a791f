//! Aggregations over the session history.
//!
//! All windows are by local calendar date and include `today`. Sessions are
//! scanned linearly; personal-scale histories make an index unnecessary.

use std::collections::HashMap;

use chrono::{Days, Local, NaiveDate};

use super::models::{DayTotal, SessionStats, StudySession, Subject, SubjectTotal, WeekTotal};

/// Local calendar date a session was recorded on.
pub fn local_day(session: &StudySession) -> NaiveDate {
    session.date.with_timezone(&Local).date_naive()
}

/// Upper bound on `daily_breakdown` rows (about ten years).
pub const MAX_BREAKDOWN_DAYS: u32 = 3660;
/// Upper bound on `weekly_breakdown` rows.
pub const MAX_BREAKDOWN_WEEKS: u32 = 520;

fn days_before(today: NaiveDate, n: u64) -> NaiveDate {
    today.checked_sub_days(Days::new(n)).unwrap_or(NaiveDate::MIN)
}

/// Totals for the trailing `window_days` days, optionally for one subject.
///
/// A window of 1 is today only; 0 matches nothing.
pub fn window_stats(
    sessions: &[StudySession],
    window_days: u32,
    subject_id: Option<&str>,
    today: NaiveDate,
) -> SessionStats {
    if window_days == 0 {
        return SessionStats::default();
    }
    let start = days_before(today, u64::from(window_days) - 1);

    sessions
        .iter()
        .filter(|s| subject_id.map_or(true, |id| s.subject_id == id))
        .filter(|s| local_day(s) >= start)
        .fold(SessionStats::default(), |mut acc, s| {
            acc.total_minutes += u64::from(s.duration_minutes);
            acc.sessions_count += 1;
            acc
        })
}

/// All-time minutes for one subject.
pub fn subject_total(sessions: &[StudySession], subject_id: &str) -> u64 {
    sessions
        .iter()
        .filter(|s| s.subject_id == subject_id)
        .map(|s| u64::from(s.duration_minutes))
        .sum()
}

/// Minutes per day for the trailing `days` days, oldest first, zero-filled.
/// `days` is capped at [`MAX_BREAKDOWN_DAYS`].
pub fn daily_breakdown(sessions: &[StudySession], days: u32, today: NaiveDate) -> Vec<DayTotal> {
    let days = days.min(MAX_BREAKDOWN_DAYS);
    let mut per_day: HashMap<NaiveDate, u64> = HashMap::new();
    for s in sessions {
        *per_day.entry(local_day(s)).or_default() += u64::from(s.duration_minutes);
    }

    (0..u64::from(days))
        .rev()
        .map(|back| {
            let date = days_before(today, back);
            DayTotal {
                date,
                minutes: per_day.get(&date).copied().unwrap_or(0),
            }
        })
        .collect()
}

/// Minutes per trailing 7-day block. `Week 1` is the oldest, the last block ends today.
/// `weeks` is capped at [`MAX_BREAKDOWN_WEEKS`].
pub fn weekly_breakdown(sessions: &[StudySession], weeks: u32, today: NaiveDate) -> Vec<WeekTotal> {
    let weeks = weeks.min(MAX_BREAKDOWN_WEEKS);
    (0..u64::from(weeks))
        .map(|i| {
            let end = days_before(today, (u64::from(weeks) - 1 - i) * 7);
            let start = days_before(end, 6);
            let minutes: u64 = sessions
                .iter()
                .filter(|s| (start..=end).contains(&local_day(s)))
                .map(|s| u64::from(s.duration_minutes))
                .sum();
            WeekTotal {
                label: format!("Week {}", i + 1),
                start,
                end,
                minutes,
            }
        })
        .collect()
}

/// Minutes per known subject, in subject order, skipping subjects with no time.
/// Sessions of deleted subjects are not attributed anywhere.
pub fn subject_breakdown(sessions: &[StudySession], subjects: &[Subject]) -> Vec<SubjectTotal> {
    subjects
        .iter()
        .filter_map(|subject| {
            let minutes = subject_total(sessions, &subject.id);
            (minutes > 0).then(|| SubjectTotal {
                subject_id: subject.id.clone(),
                name: subject.name.clone(),
                minutes,
            })
        })
        .collect()
}
