use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use countdown_gui_shared::EpochMinutes;

pub const MILLIS_PER_MINUTE: i64 = 60_000;

const INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn now_minute() -> EpochMinutes {
    minute_from_millis(now_millis())
}

pub fn minute_from_millis(millis: i64) -> EpochMinutes {
    millis / MILLIS_PER_MINUTE
}

/// Parses a deadline typed by the user.
///
/// Accepts RFC 3339 or a `datetime-local` style value read in the local
/// timezone.
pub fn parse_date_minute(input: &str) -> Option<EpochMinutes> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(minute_from_millis(parsed.timestamp_millis()));
    }

    INPUT_FORMATS.iter().find_map(|format| {
        let naive = NaiveDateTime::parse_from_str(trimmed, format).ok()?;
        let local = Local.from_local_datetime(&naive).earliest()?;
        Some(minute_from_millis(local.timestamp_millis()))
    })
}

fn local_time(minute: EpochMinutes) -> Option<DateTime<Local>> {
    let millis = minute.checked_mul(MILLIS_PER_MINUTE)?;
    Local.timestamp_millis_opt(millis).single()
}

/// Local timestamp for display, `-` when absent.
pub fn format_minute(minute: Option<EpochMinutes>) -> String {
    minute
        .and_then(local_time)
        .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Prefill value for a deadline edit field.
pub fn minute_to_input(minute: EpochMinutes) -> String {
    local_time(minute)
        .map(|time| time.format("%Y-%m-%dT%H:%M").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{format_minute, minute_from_millis, minute_to_input, parse_date_minute};

    #[test]
    fn parses_rfc3339_deadline() {
        let expected = Utc
            .with_ymd_and_hms(2026, 2, 22, 18, 30, 0)
            .single()
            .expect("valid time")
            .timestamp()
            / 60;
        assert_eq!(parse_date_minute("2026-02-22T18:30:00Z"), Some(expected));
        assert_eq!(parse_date_minute("2026-02-22T20:30:00+02:00"), Some(expected));
    }

    #[test]
    fn local_input_round_trips() {
        let minute = 29_530_000;
        let input = minute_to_input(minute);
        assert_eq!(parse_date_minute(&input), Some(minute));
    }

    #[test]
    fn rejects_garbage_input() {
        assert_eq!(parse_date_minute(""), None);
        assert_eq!(parse_date_minute("next tuesday"), None);
    }

    #[test]
    fn minute_counter_truncates() {
        assert_eq!(minute_from_millis(119_999), 1);
        assert_eq!(format_minute(None), "-");
        assert_eq!(format_minute(Some(i64::MAX)), "-");
    }
}
