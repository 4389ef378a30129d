//! Countdown and duration text.
//!
//! All functions are pure. Countdown strings carry magnitude only; the
//! `*_label` helpers add the overdue prefix.

use countdown_gui_shared::{EpochMinutes, Mark, Timer};

use crate::clock::{MILLIS_PER_MINUTE, minute_from_millis};

const MINUTES_PER_HOUR: u64 = 60;
const MINUTES_PER_DAY: u64 = 1_440;
const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_DAY: u64 = 86_400;

pub const OVERDUE_PREFIX: &str = "超时 ";

/// Granularity of the compact countdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Precision {
    Hour,
    #[default]
    Minute,
    Second,
}

impl Precision {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "hour" => Some(Self::Hour),
            "minute" => Some(Self::Minute),
            "second" => Some(Self::Second),
            _ => None,
        }
    }

    /// hour -> minute -> second -> hour
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Hour => Self::Minute,
            Self::Minute => Self::Second,
            Self::Second => Self::Hour,
        }
    }
}

pub fn format_countdown(total_minutes: i64) -> String {
    let minutes = total_minutes.unsigned_abs();

    if minutes >= MINUTES_PER_DAY {
        let days = minutes / MINUTES_PER_DAY;
        let hours = (minutes % MINUTES_PER_DAY) / MINUTES_PER_HOUR;
        if hours == 0 {
            format!("{days}天")
        } else {
            format!("{days}天{hours}时")
        }
    } else if minutes >= MINUTES_PER_HOUR {
        let hours = minutes / MINUTES_PER_HOUR;
        let rest = minutes % MINUTES_PER_HOUR;
        format!("{hours}:{rest:02}")
    } else {
        format!("{minutes}分")
    }
}

pub fn countdown_label(remaining: i64) -> String {
    with_overdue_prefix(remaining < 0, format_countdown(remaining))
}

pub fn format_compact_countdown(
    target_minute: EpochMinutes,
    precision: Precision,
    now_millis: i64,
) -> String {
    match precision {
        Precision::Hour => {
            let minutes = minute_delta(target_minute, now_millis).unsigned_abs();
            let days = minutes / MINUTES_PER_DAY;
            let hours = (minutes % MINUTES_PER_DAY) / MINUTES_PER_HOUR;
            if days > 0 {
                format!("{days}天{hours}时")
            } else {
                format!("{hours}时")
            }
        }
        Precision::Minute => {
            let minutes = minute_delta(target_minute, now_millis).unsigned_abs();
            let days = minutes / MINUTES_PER_DAY;
            let hours = (minutes % MINUTES_PER_DAY) / MINUTES_PER_HOUR;
            let rest = minutes % MINUTES_PER_HOUR;
            if days > 0 {
                format!("{days}天{hours}时{rest}分")
            } else if hours > 0 {
                format!("{hours}时{rest}分")
            } else {
                format!("{rest}分")
            }
        }
        Precision::Second => {
            let seconds = second_delta(target_minute, now_millis).unsigned_abs();
            let days = seconds / SECONDS_PER_DAY;
            let hours = (seconds % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
            let minutes = (seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
            let secs = seconds % SECONDS_PER_MINUTE;
            if days > 0 {
                format!("{days}天{hours:02}:{minutes:02}:{secs:02}")
            } else if hours > 0 {
                format!("{hours}:{minutes:02}:{secs:02}")
            } else {
                format!("{minutes:02}:{secs:02}")
            }
        }
    }
}

pub fn compact_label(target_minute: EpochMinutes, precision: Precision, now_millis: i64) -> String {
    let overdue = match precision {
        Precision::Second => second_delta(target_minute, now_millis) < 0,
        Precision::Hour | Precision::Minute => minute_delta(target_minute, now_millis) < 0,
    };
    with_overdue_prefix(
        overdue,
        format_compact_countdown(target_minute, precision, now_millis),
    )
}

pub fn format_duration(total_minutes: i64) -> String {
    let minutes = total_minutes.max(0).unsigned_abs();
    if minutes < MINUTES_PER_HOUR {
        return format!("{minutes}分钟");
    }

    let hours = minutes / MINUTES_PER_HOUR;
    let rest = minutes % MINUTES_PER_HOUR;
    if rest == 0 {
        format!("{hours}小时")
    } else {
        format!("{hours}小时{rest}分")
    }
}

/// Interval since the previous mark, `-` for the first one.
pub fn mark_interval_label(mark: &Mark) -> String {
    mark.duration_minutes
        .map(format_duration)
        .unwrap_or_else(|| "-".to_string())
}

/// Share of the `[created, target]` span already elapsed, in `0.0..=1.0`.
pub fn progress_fraction(timer: &Timer, now_minute: EpochMinutes) -> f64 {
    let span = timer.target_at_minute.saturating_sub(timer.created_at_minute);
    if span <= 0 {
        return 1.0;
    }
    let elapsed = now_minute.saturating_sub(timer.created_at_minute);
    (elapsed as f64 / span as f64).clamp(0.0, 1.0)
}

fn minute_delta(target_minute: EpochMinutes, now_millis: i64) -> i64 {
    target_minute.saturating_sub(minute_from_millis(now_millis))
}

/// Whole seconds to the target, truncated toward zero.
fn second_delta(target_minute: EpochMinutes, now_millis: i64) -> i64 {
    target_minute
        .saturating_mul(MILLIS_PER_MINUTE)
        .saturating_sub(now_millis)
        / 1_000
}

fn with_overdue_prefix(overdue: bool, text: String) -> String {
    if overdue {
        format!("{OVERDUE_PREFIX}{text}")
    } else {
        text
    }
}
