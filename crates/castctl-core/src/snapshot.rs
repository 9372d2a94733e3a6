use crate::action::ControlAction;
use crate::display::{present, DisplayStatus};
use crate::error::Result;
use crate::schedule::{derive_from_raw, parse_schedule, DerivedStatus, RawScheduleEntry};
use crate::store::{Flag, StateStore, Value};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// ControlSnapshot
// ---------------------------------------------------------------------------

/// Everything the panel needs for one render, as served by `/control`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSnapshot {
    #[serde(default)]
    pub action: String,
    pub button_paused: bool,
    pub schedule: Vec<RawScheduleEntry>,
    #[serde(default)]
    pub bandwidth: String,
    #[serde(default)]
    pub preset: String,
    #[serde(default)]
    pub recording: bool,
    #[serde(default, deserialize_with = "count_or_text")]
    pub viewers: u64,
}

impl ControlSnapshot {
    pub fn derive(&self, now: DateTime<Utc>) -> DerivedStatus {
        derive_from_raw(&self.schedule, now)
    }

    pub fn display(&self, now: DateTime<Utc>) -> DisplayStatus {
        present(&self.derive(now), self.button_paused)
    }
}

/// Older backends send the viewer count as a string.
fn count_or_text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CountOrText {
        Count(u64),
        Text(String),
    }

    Ok(match CountOrText::deserialize(deserializer)? {
        CountOrText::Count(n) => n,
        CountOrText::Text(s) => s.trim().parse().unwrap_or(0),
    })
}

// ---------------------------------------------------------------------------
// Reading the store
// ---------------------------------------------------------------------------

static DIGITS_RE: OnceLock<Regex> = OnceLock::new();
static SIGNED_DIGITS_RE: OnceLock<Regex> = OnceLock::new();
static VIEWERS_RE: OnceLock<Regex> = OnceLock::new();

fn digits_re() -> &'static Regex {
    DIGITS_RE.get_or_init(|| Regex::new(r"\d+").unwrap())
}

fn signed_digits_re() -> &'static Regex {
    SIGNED_DIGITS_RE.get_or_init(|| Regex::new(r"-?\d+").unwrap())
}

fn viewers_re() -> &'static Regex {
    VIEWERS_RE.get_or_init(|| Regex::new(r"^[1-9][0-9]{0,15}$").unwrap())
}

/// First run of digits in the stored bandwidth, `"0"` when there is none.
pub fn parse_bandwidth(text: Option<&str>) -> String {
    text.and_then(|t| digits_re().find(t))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "0".to_string())
}

/// First signed integer in the stored preset, empty when there is none.
pub fn parse_preset(text: Option<&str>) -> String {
    text.and_then(|t| signed_digits_re().find(t))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// The last line that is a plain positive count wins.
pub fn parse_viewers(text: Option<&str>) -> u64 {
    text.map(|t| {
        t.lines()
            .map(str::trim)
            .filter(|line| viewers_re().is_match(line))
            .filter_map(|line| line.parse::<u64>().ok())
            .last()
            .unwrap_or(0)
    })
    .unwrap_or(0)
}

/// Assemble the snapshot from the store, echoing `action` back.
pub fn read_snapshot(store: &dyn StateStore, action: &str) -> Result<ControlSnapshot> {
    let schedule = store
        .value(Value::Schedule)?
        .map(|text| parse_schedule(&text))
        .unwrap_or_default();
    let bandwidth = parse_bandwidth(store.value(Value::Bandwidth)?.as_deref());
    let preset = parse_preset(store.value(Value::Preset)?.as_deref());
    let viewers = parse_viewers(store.value(Value::Viewers)?.as_deref());

    Ok(ControlSnapshot {
        action: action.to_string(),
        button_paused: store.flag(Flag::Pause)?,
        schedule,
        bandwidth,
        preset,
        recording: store.flag(Flag::Recording)?,
        viewers,
    })
}

/// One request to the control endpoint: apply the action, then read back.
pub fn handle_action(store: &dyn StateStore, raw_action: &str) -> Result<ControlSnapshot> {
    let action = ControlAction::parse(raw_action);
    action.apply(store)?;
    if action.is_mutation() {
        tracing::info!(action = %action, "control action applied");
    }
    read_snapshot(store, raw_action)
}
