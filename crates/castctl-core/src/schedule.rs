//! Schedule normalization and state derivation.
//!
//! The schedule is a bag of `(action, timestamp, org)` rows. Each poll turns
//! it into a time-ordered list and scans it once against "now" to find the
//! boundary in effect and the next one coming up.

use crate::types::BroadcastState;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::sync::OnceLock;

pub const UNKNOWN_ORG: &str = "unknown";

// ---------------------------------------------------------------------------
// Raw rows
// ---------------------------------------------------------------------------

/// One schedule row as stored and as sent over the wire:
/// `[action, timestampText, orgText]`.
///
/// Deserializing accepts short arrays (missing fields become empty) and
/// rejoins extra fields into the org, so rows split on every comma survive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>")]
pub struct RawScheduleEntry(pub String, pub String, pub String);

impl From<Vec<String>> for RawScheduleEntry {
    fn from(fields: Vec<String>) -> Self {
        let mut fields = fields.into_iter();
        let action = fields.next().unwrap_or_default();
        let timestamp = fields.next().unwrap_or_default();
        let org = fields.collect::<Vec<_>>().join(",");
        Self(action, timestamp, org)
    }
}

impl RawScheduleEntry {
    pub fn new(
        action: impl Into<String>,
        timestamp: impl Into<String>,
        org: impl Into<String>,
    ) -> Self {
        Self(action.into(), timestamp.into(), org.into())
    }

    pub fn action(&self) -> &str {
        &self.0
    }

    pub fn timestamp(&self) -> &str {
        &self.1
    }

    pub fn org(&self) -> &str {
        &self.2
    }

    /// Parse one `action,timestamp,org` line. Lines without a comma are not
    /// schedule rows and yield `None`; a missing org becomes empty.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_end();
        if !line.contains(',') {
            return None;
        }
        let mut fields = line.splitn(3, ',');
        let action = fields.next().unwrap_or_default();
        let timestamp = fields.next().unwrap_or_default();
        let org = fields.next().unwrap_or_default();
        Some(Self::new(action, timestamp, org))
    }

    pub fn to_line(&self) -> String {
        format!("{},{},{}", self.0, self.1, self.2)
    }
}

/// Parse the whole schedule file, silently dropping lines that are not rows.
pub fn parse_schedule(text: &str) -> Vec<RawScheduleEntry> {
    text.lines().filter_map(RawScheduleEntry::parse_line).collect()
}

// ---------------------------------------------------------------------------
// Normalized entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub action: BroadcastState,
    /// `None` when the stored text could not be parsed.
    pub at: Option<DateTime<Utc>>,
    pub org: String,
}

impl ScheduleEntry {
    pub fn normalize(raw: &RawScheduleEntry) -> Self {
        Self {
            action: BroadcastState::parse(raw.action()),
            at: parse_timestamp(raw.timestamp()),
            org: title_case_org(raw.org()),
        }
    }
}

/// Normalize every row and stable-sort by instant.
///
/// `Option<DateTime>` orders `None` before any instant, so rows with an
/// unreadable timestamp land at the front; rows sharing an instant keep
/// their input order.
pub fn normalize(raw: &[RawScheduleEntry]) -> Vec<ScheduleEntry> {
    let mut entries: Vec<ScheduleEntry> = raw.iter().map(ScheduleEntry::normalize).collect();
    entries.sort_by(|a, b| a.at.cmp(&b.at));
    entries
}

static WORD_SEP_RE: OnceLock<Regex> = OnceLock::new();

fn word_sep_re() -> &'static Regex {
    WORD_SEP_RE.get_or_init(|| Regex::new(r"[_\s]+").unwrap())
}

/// `"first_ward  branch"` → `"First Ward Branch"`. Only the first character of
/// each word is touched.
pub fn title_case_org(org: &str) -> String {
    word_sep_re()
        .split(org)
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Parse the timestamp forms the appliance writes or accepts.
///
/// Zone-less forms are read as local wall-clock time.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(stripped) = text.strip_suffix('Z') {
        for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(stripped, fmt) {
                return Some(Utc.from_utc_datetime(&naive));
            }
        }
        return None;
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return local_to_utc(naive);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return local_to_utc(date.and_hms_opt(0, 0, 0)?);
    }
    None
}

fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format an instant the way the schedule writer stores it.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%SZ").to_string()
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// The schedule's verdict for one instant, before any operator override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStatus {
    pub state: BroadcastState,
    pub org: String,
    pub next_state: BroadcastState,
    pub next_org: String,
    /// Serialized as epoch milliseconds, `0` when nothing is pending.
    #[serde(serialize_with = "serialize_epoch_ms")]
    pub next_time: Option<DateTime<Utc>>,
}

impl Default for DerivedStatus {
    fn default() -> Self {
        Self {
            state: BroadcastState::Unknown,
            org: UNKNOWN_ORG.to_string(),
            next_state: BroadcastState::Unknown,
            next_org: UNKNOWN_ORG.to_string(),
            next_time: None,
        }
    }
}

impl DerivedStatus {
    pub fn next_time_ms(&self) -> i64 {
        self.next_time.map(|t| t.timestamp_millis()).unwrap_or(0)
    }
}

pub(crate) fn serialize_epoch_ms<S: Serializer>(
    value: &Option<DateTime<Utc>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_i64(value.map(|t| t.timestamp_millis()).unwrap_or(0))
}

/// Scan a sorted schedule against `now`.
///
/// Every past boundary overwrites the current state, so the last one wins.
/// The first future boundary becomes the pending transition and ends the
/// scan; if no boundary has passed yet, the current state is inferred from
/// it. Rows without an instant are skipped.
pub fn derive(entries: &[ScheduleEntry], now: DateTime<Utc>) -> DerivedStatus {
    let mut status = DerivedStatus::default();

    for entry in entries {
        let Some(at) = entry.at else {
            continue;
        };
        if now >= at {
            status.state = entry.action.clone();
            status.org = entry.org.clone();
            continue;
        }

        status.next_state = entry.action.clone();
        status.next_org = entry.org.clone();
        status.next_time = Some(at);
        if status.state.is_unknown() {
            status.state = entry.action.preroll();
        }
        break;
    }

    status
}

/// Normalize then derive, the full per-poll computation.
pub fn derive_from_raw(raw: &[RawScheduleEntry], now: DateTime<Utc>) -> DerivedStatus {
    derive(&normalize(raw), now)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
