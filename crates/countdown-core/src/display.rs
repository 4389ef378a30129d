//! Values a surface shows for the current session, derived on demand.

use countdown_gui_shared::EpochMinutes;

use crate::bridge::HostRuntime;
use crate::clock::minute_from_millis;
use crate::format::{Precision, compact_label, countdown_label, progress_fraction};
use crate::store::{SessionState, SessionStore};
use crate::urgency::{Urgency, classify};

#[derive(Debug, Clone, PartialEq)]
pub struct TimerDisplay {
    pub id: String,
    pub name: String,
    pub remaining: EpochMinutes,
    pub urgency: Urgency,
    pub countdown: String,
    pub progress: f64,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySnapshot {
    pub now_minute: EpochMinutes,
    pub timers: Vec<TimerDisplay>,
    /// Countdown of the selected timer at the compact precision.
    pub compact: Option<String>,
    pub compact_precision: Precision,
}

impl DisplaySnapshot {
    /// `None` when there are no timers, so a tick has nothing to redraw.
    pub fn from_state(state: &SessionState, now_millis: i64) -> Option<Self> {
        if state.timers.is_empty() {
            return None;
        }

        let now_minute = minute_from_millis(now_millis);
        let selected = state.selected_timer_id.as_deref();
        let timers = state
            .timers
            .iter()
            .map(|timer| {
                let remaining = timer.remaining_minutes(now_minute);
                TimerDisplay {
                    id: timer.id.clone(),
                    name: timer.name.clone(),
                    remaining,
                    urgency: classify(remaining),
                    countdown: countdown_label(remaining),
                    progress: progress_fraction(timer, now_minute),
                    selected: selected == Some(timer.id.as_str()),
                }
            })
            .collect();

        let precision = state.preferences.compact_precision;
        let compact = state
            .selected_timer()
            .map(|timer| compact_label(timer.target_at_minute, precision, now_millis));

        Some(Self {
            now_minute,
            timers,
            compact,
            compact_precision: precision,
        })
    }
}

impl<H: HostRuntime> SessionStore<H> {
    pub fn snapshot(&self, now_millis: i64) -> Option<DisplaySnapshot> {
        DisplaySnapshot::from_state(&self.state(), now_millis)
    }
}
