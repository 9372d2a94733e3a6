//! Client-side state carried between polls.

use crate::display::DisplayStatus;
use crate::snapshot::ControlSnapshot;
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

pub const DEFAULT_PRESET_COOLDOWN: Duration = Duration::from_millis(1000);

/// Result of folding one snapshot into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUpdate {
    pub display: DisplayStatus,
    /// The rendered state differs from the previous poll's.
    pub changed: bool,
}

/// What the poller owns between ticks.
///
/// Snapshots are applied in completion order; the latest completed response
/// always wins.
#[derive(Debug, Clone)]
pub struct ControlSession {
    last_display: Option<DisplayStatus>,
    headline: Option<String>,
    preview_open: bool,
    streaming: bool,
    preset_cooldown: Duration,
    moving_until: Option<Instant>,
    highlighted_preset: Option<i64>,
    bandwidth: Option<String>,
    recording: bool,
    viewers: u64,
}

impl Default for ControlSession {
    fn default() -> Self {
        Self::new(DEFAULT_PRESET_COOLDOWN)
    }
}

impl ControlSession {
    pub fn new(preset_cooldown: Duration) -> Self {
        Self {
            last_display: None,
            headline: None,
            preview_open: false,
            streaming: false,
            preset_cooldown,
            moving_until: None,
            highlighted_preset: None,
            bandwidth: None,
            recording: false,
            viewers: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Polling
    // -----------------------------------------------------------------------

    /// The action word for the next poll. While the preview is open every
    /// poll keeps the stream alive; the first poll after it closes stops it.
    pub fn next_poll_action(&mut self) -> &'static str {
        if self.preview_open {
            self.streaming = true;
            "preview"
        } else if self.streaming {
            self.streaming = false;
            "stoppreview"
        } else {
            "status"
        }
    }

    /// Sent once when the session ends, whatever the preview state.
    pub fn teardown_action(&self) -> &'static str {
        "stoppreview"
    }

    pub fn set_preview_open(&mut self, open: bool) {
        self.preview_open = open;
    }

    pub fn toggle_preview(&mut self) -> bool {
        self.preview_open = !self.preview_open;
        self.preview_open
    }

    pub fn preview_open(&self) -> bool {
        self.preview_open
    }

    /// A preview was streamed and has not been stopped yet.
    pub fn streaming(&self) -> bool {
        self.streaming
    }

    /// Fold in the most recently completed snapshot.
    pub fn apply(&mut self, snapshot: &ControlSnapshot, now: DateTime<Utc>) -> SessionUpdate {
        self.apply_at(snapshot, now, Instant::now())
    }

    pub fn apply_at(
        &mut self,
        snapshot: &ControlSnapshot,
        now: DateTime<Utc>,
        clock: Instant,
    ) -> SessionUpdate {
        let display = snapshot.display(now);
        let changed = self
            .last_display
            .as_ref()
            .map_or(true, |prev| prev.state != display.state || prev.org != display.org);

        if let Some(text) = display.status_text() {
            self.headline = Some(text);
        }
        self.report_preset(&snapshot.preset, clock);
        self.bandwidth = Some(snapshot.bandwidth.clone()).filter(|b| !b.is_empty());
        self.recording = snapshot.recording;
        self.viewers = snapshot.viewers;
        self.last_display = Some(display.clone());

        if changed {
            let (state, org) = (&display.state, &display.org);
            tracing::debug!(state = %state, org = %org, "display state changed");
        }
        SessionUpdate { display, changed }
    }

    pub fn last_display(&self) -> Option<&DisplayStatus> {
        self.last_display.as_ref()
    }

    /// Latest headline; states without wording keep the previous one.
    pub fn headline(&self) -> Option<&str> {
        self.headline.as_deref()
    }

    pub fn bandwidth(&self) -> Option<&str> {
        self.bandwidth.as_deref()
    }

    pub fn recording(&self) -> bool {
        self.recording
    }

    pub fn viewers(&self) -> u64 {
        self.viewers
    }

    // -----------------------------------------------------------------------
    // Camera presets
    // -----------------------------------------------------------------------

    /// Operator picked a preset: highlight it now and ignore server reports
    /// until the camera has had time to move.
    pub fn select_preset(&mut self, preset: i64, clock: Instant) {
        self.highlighted_preset = Some(preset);
        self.moving_until = Some(clock + self.preset_cooldown);
    }

    pub fn highlighted_preset(&self) -> Option<i64> {
        self.highlighted_preset
    }

    pub fn is_moving(&self, clock: Instant) -> bool {
        self.moving_until.is_some_and(|until| clock < until)
    }

    fn report_preset(&mut self, reported: &str, clock: Instant) {
        match reported.trim().parse::<i64>() {
            Ok(n) if n < 0 => self.highlighted_preset = None,
            Ok(0) => {}
            _ if self.is_moving(clock) => {}
            Ok(n) => self.highlighted_preset = Some(n),
            Err(_) => self.highlighted_preset = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{parse_timestamp, RawScheduleEntry};
    use crate::types::BroadcastState;

    fn snapshot(paused: bool, preset: &str) -> ControlSnapshot {
        ControlSnapshot {
            action: "status".into(),
            button_paused: paused,
            schedule: vec![
                RawScheduleEntry::new("start", "2024-03-10 09:00:00Z", "ward"),
                RawScheduleEntry::new("stop", "2024-03-10 10:10:00Z", "ward"),
            ],
            bandwidth: "3000".into(),
            preset: preset.into(),
            recording: false,
            viewers: 4,
        }
    }

    fn now() -> DateTime<Utc> {
        parse_timestamp("2024-03-10 09:30:00Z").unwrap()
    }

    #[test]
    fn poll_action_follows_preview_lifecycle() {
        let mut session = ControlSession::default();
        assert_eq!(session.next_poll_action(), "status");

        session.set_preview_open(true);
        assert_eq!(session.next_poll_action(), "preview");
        assert_eq!(session.next_poll_action(), "preview");
        assert!(session.streaming());

        session.set_preview_open(false);
        assert_eq!(session.next_poll_action(), "stoppreview");
        assert_eq!(session.next_poll_action(), "status");
        assert_eq!(session.teardown_action(), "stoppreview");
    }

    #[test]
    fn closing_before_any_poll_sends_no_stop() {
        let mut session = ControlSession::default();
        assert!(session.toggle_preview());
        assert!(!session.toggle_preview());
        assert_eq!(session.next_poll_action(), "status");
    }

    #[test]
    fn apply_reports_state_changes() {
        let mut session = ControlSession::default();
        let first = session.apply(&snapshot(false, "1"), now());
        assert!(first.changed);
        assert_eq!(first.display.state, BroadcastState::Start);
        assert_eq!(session.headline(), Some("Broadcasting (Ward)"));

        let same = session.apply(&snapshot(false, "1"), now());
        assert!(!same.changed);

        let paused = session.apply(&snapshot(true, "1"), now());
        assert!(paused.changed);
        assert_eq!(paused.display.state, BroadcastState::Paused);
        assert_eq!(session.bandwidth(), Some("3000"));
        assert_eq!(session.viewers(), 4);
    }

    #[test]
    fn unworded_state_keeps_previous_headline() {
        let mut session = ControlSession::default();
        session.apply(&snapshot(false, ""), now());
        let empty = ControlSnapshot {
            schedule: Vec::new(),
            ..snapshot(false, "")
        };
        let update = session.apply(&empty, now());
        assert_eq!(update.display.state, BroadcastState::Unknown);
        assert_eq!(session.headline(), Some("Broadcasting (Ward)"));
    }

    #[test]
    fn preset_cooldown_ignores_server_reports() {
        let mut session = ControlSession::new(Duration::from_millis(1000));
        let t0 = Instant::now();
        session.apply_at(&snapshot(false, "2"), now(), t0);
        assert_eq!(session.highlighted_preset(), Some(2));

        session.select_preset(5, t0);
        session.apply_at(&snapshot(false, "2"), now(), t0 + Duration::from_millis(500));
        assert_eq!(session.highlighted_preset(), Some(5));

        session.apply_at(&snapshot(false, "5"), now(), t0 + Duration::from_millis(1500));
        assert_eq!(session.highlighted_preset(), Some(5));
        session.apply_at(&snapshot(false, "3"), now(), t0 + Duration::from_millis(2000));
        assert_eq!(session.highlighted_preset(), Some(3));
    }

    #[test]
    fn preset_reports_clear_or_are_ignored() {
        let mut session = ControlSession::default();
        let t0 = Instant::now();
        session.apply_at(&snapshot(false, "4"), now(), t0);

        session.apply_at(&snapshot(false, "0"), now(), t0);
        assert_eq!(session.highlighted_preset(), Some(4));

        session.apply_at(&snapshot(false, "-1"), now(), t0);
        assert_eq!(session.highlighted_preset(), None);

        session.apply_at(&snapshot(false, "4"), now(), t0);
        session.apply_at(&snapshot(false, ""), now(), t0);
        assert_eq!(session.highlighted_preset(), None);
    }
}
