use std::fmt;

use chrono::{DateTime, Utc};

use crate::contests::catalog::TimeUntil;

const MS_PER_DAY: i64 = 86_400_000;
const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_SECOND: i64 = 1_000;

/// What the countdown label shows on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCategory {
    Expired,
    Pending {
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
    },
    NoUpcomingEvent,
    Loading,
    LoadFailed,
}

impl DisplayCategory {
    /// `Expired` for anything not strictly in the future, otherwise the
    /// floored day/hour/minute/second split.
    pub fn from_remaining_ms(ms: i64) -> Self {
        if ms <= 0 {
            return DisplayCategory::Expired;
        }
        DisplayCategory::Pending {
            days: ms / MS_PER_DAY,
            hours: (ms % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (ms % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (ms % MS_PER_MINUTE) / MS_PER_SECOND,
        }
    }

    /// Countdown towards a fixed instant.
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self::from_remaining_ms((target - now).num_milliseconds())
    }
}

impl From<TimeUntil> for DisplayCategory {
    fn from(value: TimeUntil) -> Self {
        match value {
            TimeUntil::Remaining(delta) => Self::from_remaining_ms(delta.num_milliseconds()),
            TimeUntil::NoUpcomingEvent => DisplayCategory::NoUpcomingEvent,
            TimeUntil::Loading => DisplayCategory::Loading,
            TimeUntil::LoadFailed => DisplayCategory::LoadFailed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFormat {
    pub show_seconds: bool,
}

impl Default for TimerFormat {
    fn default() -> Self {
        Self { show_seconds: true }
    }
}

impl TimerFormat {
    pub fn text(&self, category: &DisplayCategory) -> String {
        match *category {
            DisplayCategory::Pending {
                days,
                hours,
                minutes,
                seconds,
            } => {
                if self.show_seconds {
                    format!("{}d {}h {}m {}s Left", days, hours, minutes, seconds)
                } else {
                    format!("{}d {}h {}m Left", days, hours, minutes)
                }
            }
            DisplayCategory::Expired => "Contest has Started".to_string(),
            DisplayCategory::NoUpcomingEvent => "No upcoming contests".to_string(),
            DisplayCategory::Loading => "Loading data".to_string(),
            DisplayCategory::LoadFailed => "Failed to load data".to_string(),
        }
    }
}

impl fmt::Display for DisplayCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&TimerFormat::default().text(self))
    }
}
