//! Day-granularity streak tracking.
//!
//! A streak counts consecutive local calendar days with at least one
//! committed session. Only the calendar date of the last study day is kept.

use chrono::{Days, NaiveDate};

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Streak value after studying on `today`.
///
/// Same day: unchanged. Day after `last_study_day`: +1. Anything else
/// (never studied, missed days, or a last day in the future): restart at 1.
pub fn next_streak(current: u32, last_study_day: Option<NaiveDate>, today: NaiveDate) -> u32 {
    match last_study_day {
        Some(last) if last == today => current,
        Some(last) if today.checked_sub_days(Days::new(1)) == Some(last) => {
            current.saturating_add(1)
        }
        _ => 1,
    }
}

/// Replay [`next_streak`] over study days in commit order.
///
/// Returns the resulting streak and last study day.
pub fn replay<I>(days: I) -> (u32, Option<NaiveDate>)
where
    I: IntoIterator<Item = NaiveDate>,
{
    days.into_iter().fold((0, None), |(streak, last), today| {
        (next_streak(streak, last, today), Some(today))
    })
}

pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DAY_FORMAT).ok()
}
