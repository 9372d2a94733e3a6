use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// BroadcastState
// ---------------------------------------------------------------------------

/// An action word from the schedule, or a state derived from one.
///
/// The vocabulary is open-ended: words outside the canonical set are kept
/// verbatim (lower-cased) in `Other` so they round-trip through the JSON
/// payload unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BroadcastState {
    Start,
    Stop,
    Pause,
    Paused,
    Broadcast,
    Broadcasting,
    Holding,
    #[default]
    Unknown,
    Other(String),
}

impl BroadcastState {
    pub fn parse(word: &str) -> Self {
        let lower = word.trim().to_lowercase();
        match lower.as_str() {
            "start" => BroadcastState::Start,
            "stop" => BroadcastState::Stop,
            "pause" => BroadcastState::Pause,
            "paused" => BroadcastState::Paused,
            "broadcast" => BroadcastState::Broadcast,
            "broadcasting" => BroadcastState::Broadcasting,
            "holding" => BroadcastState::Holding,
            "unknown" => BroadcastState::Unknown,
            _ => BroadcastState::Other(lower),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BroadcastState::Start => "start",
            BroadcastState::Stop => "stop",
            BroadcastState::Pause => "pause",
            BroadcastState::Paused => "paused",
            BroadcastState::Broadcast => "broadcast",
            BroadcastState::Broadcasting => "broadcasting",
            BroadcastState::Holding => "holding",
            BroadcastState::Unknown => "unknown",
            BroadcastState::Other(word) => word,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, BroadcastState::Unknown)
    }

    /// True when the schedule says the broadcast is "on": any word containing
    /// `broadcast`, `start` or `pause`.
    pub fn is_active_family(&self) -> bool {
        let word = self.as_str();
        ["broadcast", "start", "pause"]
            .iter()
            .any(|needle| word.contains(needle))
    }

    /// The state implied before the first upcoming boundary when nothing has
    /// happened yet: a pending start means we are stopped, and vice versa.
    pub fn preroll(&self) -> BroadcastState {
        match self {
            BroadcastState::Start | BroadcastState::Broadcast => BroadcastState::Stop,
            BroadcastState::Stop => BroadcastState::Start,
            _ => BroadcastState::Unknown,
        }
    }
}

impl fmt::Display for BroadcastState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for BroadcastState {
    fn from(s: String) -> Self {
        BroadcastState::parse(&s)
    }
}

impl From<&str> for BroadcastState {
    fn from(s: &str) -> Self {
        BroadcastState::parse(s)
    }
}

impl From<BroadcastState> for String {
    fn from(state: BroadcastState) -> Self {
        state.as_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// ScheduleKind
// ---------------------------------------------------------------------------

/// The opening boundary of a scheduled window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    /// A future broadcast created ahead of time.
    #[default]
    Start,
    /// A broadcast that is going live now.
    Broadcast,
    /// A window that opens on the pause card.
    Pause,
}

impl ScheduleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleKind::Start => "start",
            ScheduleKind::Broadcast => "broadcast",
            ScheduleKind::Pause => "pause",
        }
    }
}

impl fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScheduleKind {
    type Err = crate::error::CastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" => Ok(ScheduleKind::Start),
            "broadcast" => Ok(ScheduleKind::Broadcast),
            "pause" | "paused" => Ok(ScheduleKind::Pause),
            _ => Err(crate::error::CastError::InvalidScheduleKind(s.to_string())),
        }
    }
}
