//! Writer side of the schedule file.
//!
//! Scheduling a window replaces everything the org had with a fresh
//! `{kind},{start}` / `stop,{stop}` pair. Extending moves the org's stop
//! rows and leaves the rest alone.

use crate::error::{CastError, Result};
use crate::schedule::{format_timestamp, parse_schedule, RawScheduleEntry};
use crate::store::{StateStore, Value};
use crate::types::ScheduleKind;
use chrono::{DateTime, Duration, DurationRound, Utc};

/// Default broadcast length for a newly scheduled window.
pub const DEFAULT_RUN_TIME: &str = "1:10:00";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleBook {
    rows: Vec<RawScheduleEntry>,
}

impl ScheduleBook {
    pub fn parse(text: &str) -> Self {
        Self {
            rows: parse_schedule(text),
        }
    }

    pub fn load(store: &dyn StateStore) -> Result<Self> {
        Ok(store
            .value(Value::Schedule)?
            .map(|text| Self::parse(&text))
            .unwrap_or_default())
    }

    pub fn save(&self, store: &dyn StateStore) -> Result<()> {
        store.set_value(Value::Schedule, &self.to_text())
    }

    pub fn rows(&self) -> &[RawScheduleEntry] {
        &self.rows
    }

    pub fn to_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| format!("{}\n", row.to_line()))
            .collect()
    }

    /// Replace every row of `org` with a new window.
    pub fn schedule_window(
        &mut self,
        kind: ScheduleKind,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
        org: &str,
    ) {
        let org = org.trim().to_lowercase();
        self.rows.retain(|row| !same_org(row, &org));
        self.rows.push(RawScheduleEntry::new(
            kind.as_str(),
            format_timestamp(start),
            org.clone(),
        ));
        self.rows
            .push(RawScheduleEntry::new("stop", format_timestamp(stop), org));
    }

    /// Move every stop row of `org` to `stop`. Returns how many rows moved.
    pub fn extend(&mut self, org: &str, stop: DateTime<Utc>) -> Result<usize> {
        let org = org.trim().to_lowercase();
        let mut moved = 0;
        for row in self.rows.iter_mut() {
            if same_org(row, &org) && row.action().eq_ignore_ascii_case("stop") {
                *row = RawScheduleEntry::new("stop", format_timestamp(stop), org.clone());
                moved += 1;
            }
        }
        if moved == 0 {
            return Err(CastError::OrgNotScheduled(org));
        }
        Ok(moved)
    }
}

fn same_org(row: &RawScheduleEntry, lower_org: &str) -> bool {
    row.org().trim().to_lowercase() == lower_org
}

// ---------------------------------------------------------------------------
// Window helpers
// ---------------------------------------------------------------------------

/// Parse an `H:MM:SS` run time.
pub fn parse_run_time(text: &str) -> Result<Duration> {
    let invalid = || CastError::InvalidRunTime(text.to_string());
    let parts: Vec<&str> = text.trim().split(':').collect();
    let [h, m, s] = parts.as_slice() else {
        return Err(invalid());
    };
    let h: i64 = h.parse().map_err(|_| invalid())?;
    let m: i64 = m.parse().map_err(|_| invalid())?;
    let s: i64 = s.parse().map_err(|_| invalid())?;
    if h < 0 || !(0..60).contains(&m) || !(0..60).contains(&s) {
        return Err(invalid());
    }
    Ok(Duration::hours(h) + Duration::minutes(m) + Duration::seconds(s))
}

/// Start of an unscheduled "go now" window: `now` rounded down to five minutes.
pub fn default_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.duration_trunc(Duration::minutes(5)).unwrap_or(now)
}
