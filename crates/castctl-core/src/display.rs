use crate::schedule::{DerivedStatus, UNKNOWN_ORG};
use crate::types::BroadcastState;
use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use serde::Serialize;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// ---------------------------------------------------------------------------
// DisplayStatus
// ---------------------------------------------------------------------------

/// What the operator sees: the derived status with the manual pause folded in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayStatus {
    pub state: BroadcastState,
    pub org: String,
    pub next_state: BroadcastState,
    pub next_org: String,
    #[serde(serialize_with = "crate::schedule::serialize_epoch_ms")]
    pub next_time: Option<DateTime<Utc>>,
    pub manual_pause: bool,
}

/// Overlay the operator's pause flag on the schedule's verdict.
///
/// A paused schedule-on window shows as `paused`; a pause flag set while the
/// schedule is off (e.g. to block an imminent start) shows as `holding`.
pub fn present(derived: &DerivedStatus, manual_pause: bool) -> DisplayStatus {
    let state = if !manual_pause {
        derived.state.clone()
    } else if derived.state.is_active_family() {
        BroadcastState::Paused
    } else {
        BroadcastState::Holding
    };

    DisplayStatus {
        state,
        org: derived.org.clone(),
        next_state: derived.next_state.clone(),
        next_org: derived.next_org.clone(),
        next_time: derived.next_time,
        manual_pause,
    }
}

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------

/// Appearance of the pause/resume toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleAppearance {
    Pause,
    Resume,
    /// Resume, styled as held.
    ResumeHolding,
    /// Schedule is stopped; pressing it holds the next start.
    Blocked,
}

impl ToggleAppearance {
    pub fn for_state(state: &BroadcastState) -> Self {
        match state {
            BroadcastState::Paused => ToggleAppearance::Resume,
            BroadcastState::Holding => ToggleAppearance::ResumeHolding,
            BroadcastState::Stop => ToggleAppearance::Blocked,
            _ => ToggleAppearance::Pause,
        }
    }

    /// The action word a press of the toggle sends.
    pub fn press_action(self) -> &'static str {
        match self {
            ToggleAppearance::Resume | ToggleAppearance::ResumeHolding => "resume",
            ToggleAppearance::Pause | ToggleAppearance::Blocked => "pause",
        }
    }
}

impl DisplayStatus {
    pub fn toggle(&self) -> ToggleAppearance {
        ToggleAppearance::for_state(&self.state)
    }

    pub fn extend_visible(&self) -> bool {
        self.state.is_active_family()
    }

    /// Headline text, or `None` for states the panel has no wording for (the
    /// previous headline stays up).
    pub fn status_text(&self) -> Option<String> {
        let org_info = if self.org.is_empty() || self.org == UNKNOWN_ORG {
            String::new()
        } else {
            format!(" ({})", self.org)
        };
        match self.state {
            BroadcastState::Broadcast | BroadcastState::Start => {
                Some(format!("Broadcasting{org_info}"))
            }
            BroadcastState::Stop => Some("Stopped".to_string()),
            BroadcastState::Pause | BroadcastState::Paused => {
                Some(format!("Broadcast paused{org_info}"))
            }
            BroadcastState::Holding => Some("Broadcast held".to_string()),
            _ => None,
        }
    }

    /// The "what happens next" line; empty when nothing is pending or the
    /// next boundary is neither a start nor a stop.
    pub fn next_text<Tz: TimeZone>(&self, now: DateTime<Utc>, tz: &Tz) -> String {
        let Some(next) = self.next_time else {
            return String::new();
        };
        let when = countdown(next, now, tz);
        match self.next_state {
            BroadcastState::Start => format!("{} starting{when}", self.next_org),
            BroadcastState::Stop => format!("Stopping{when}"),
            _ => String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Countdown
// ---------------------------------------------------------------------------

/// Human countdown to `next`: seconds, minutes, hours, or an absolute date
/// once it is more than a day out. The leading space is part of the text.
pub fn countdown<Tz: TimeZone>(next: DateTime<Utc>, now: DateTime<Utc>, tz: &Tz) -> String {
    let secs = (next - now).num_milliseconds().div_euclid(1000);

    if secs > 24 * 60 * 60 {
        format_absolute(&next.with_timezone(tz))
    } else if secs > 60 * 60 {
        format!(" in {} hours", (secs as f64 / 3600.0).round() as i64)
    } else if secs > 60 {
        format!(" in {} minutes", (secs as f64 / 60.0).round() as i64)
    } else {
        format!(" in {secs} seconds")
    }
}

/// `" on Sun, Mar 10 at 9:05am"`.
pub fn format_absolute<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    let dow = DAY_NAMES[at.weekday().num_days_from_sunday() as usize];
    let mon = MONTH_NAMES[at.month0() as usize];
    let (is_pm, hour) = at.hour12();
    let ampm = if is_pm { "pm" } else { "am" };
    format!(
        " on {dow}, {mon} {} at {hour}:{:02}{ampm}",
        at.day(),
        at.minute()
    )
}
