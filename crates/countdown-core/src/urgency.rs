/// Urgency tiers, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Urgency {
    Relaxed,
    Normal,
    Warning,
    Danger,
    Overdue,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relaxed => "relaxed",
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Danger => "danger",
            Self::Overdue => "overdue",
        }
    }
}

/// Upper bounds are inclusive: 10 is danger, 11 is warning.
pub fn classify(remaining_minutes: i64) -> Urgency {
    if remaining_minutes < 0 {
        Urgency::Overdue
    } else if remaining_minutes <= 10 {
        Urgency::Danger
    } else if remaining_minutes <= 30 {
        Urgency::Warning
    } else if remaining_minutes <= 120 {
        Urgency::Normal
    } else {
        Urgency::Relaxed
    }
}
