//! Display helpers for durations and progress.

/// `MM:SS`. Minutes are not wrapped at an hour.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// `HH:MM:SS`.
pub fn format_clock_hours(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// `part` as a percentage of `total`, capped at 100. Zero total is 0%.
pub fn progress_pct(part: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    (part / total * 100.0).clamp(0.0, 100.0)
}
