use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub fn is_break(self) -> bool {
        !matches!(self, TimerMode::Focus)
    }
}

/// Durations per mode and the long-break cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    pub focus_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    /// Every n-th completed focus period is followed by a long break.
    pub cycles_before_long_break: u32,
}

impl TimerSettings {
    pub fn minutes_for(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Focus => self.focus_minutes,
            TimerMode::ShortBreak => self.short_break_minutes,
            TimerMode::LongBreak => self.long_break_minutes,
        }
    }

    /// Get mode duration in milliseconds.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn duration_ms(&self, mode: TimerMode) -> u64 {
        minutes_to_ms(self.minutes_for(mode))
    }

    /// Mode that follows `mode` once it expires.
    ///
    /// `completed_focus` is the number of focus periods completed so far,
    /// including the one that just expired.
    pub fn next_mode(&self, mode: TimerMode, completed_focus: u32) -> TimerMode {
        match mode {
            TimerMode::Focus => {
                let cycles = self.cycles_before_long_break.max(1);
                if completed_focus > 0 && completed_focus % cycles == 0 {
                    TimerMode::LongBreak
                } else {
                    TimerMode::ShortBreak
                }
            }
            TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Focus,
        }
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            cycles_before_long_break: 4,
        }
    }
}

pub(crate) fn minutes_to_ms(minutes: u32) -> u64 {
    u64::from(minutes).saturating_mul(60).saturating_mul(1000)
}
