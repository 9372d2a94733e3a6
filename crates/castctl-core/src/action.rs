use crate::error::Result;
use crate::store::{Flag, StateStore, Value};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// ControlAction
// ---------------------------------------------------------------------------

/// Operator commands accepted by the control endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlAction {
    Resume,
    Pause,
    /// One-shot request to lengthen the current window. Never cleared here.
    Extend,
    /// The digit run as sent; any length is stored verbatim.
    Bandwidth(String),
    Preview,
    StopPreview,
    Record,
    StopRecord,
    /// Reserved for camera-move signalling.
    Moving,
    Status,
    /// Anything else; answered with a status read and no mutation.
    Unknown(String),
}

static BANDWIDTH_RE: OnceLock<Regex> = OnceLock::new();

fn bandwidth_re() -> &'static Regex {
    BANDWIDTH_RE.get_or_init(|| Regex::new(r"bandwidth(\d+)").unwrap())
}

impl ControlAction {
    /// Case-insensitive substring match, first match wins. `preview` and
    /// `record` only match as prefixes so `stoppreview`/`stoprecord` reach
    /// their own arms. An empty action is a plain status read.
    pub fn parse(raw: &str) -> Self {
        let word = raw.trim().to_lowercase();

        if word.is_empty() {
            return ControlAction::Status;
        }
        if word.contains("resume") {
            return ControlAction::Resume;
        }
        if word.contains("pause") {
            return ControlAction::Pause;
        }
        if word.contains("extend") {
            return ControlAction::Extend;
        }
        if let Some(caps) = bandwidth_re().captures(&word) {
            return ControlAction::Bandwidth(caps[1].to_string());
        }
        if word.starts_with("preview") {
            return ControlAction::Preview;
        }
        if word.contains("stoppreview") {
            return ControlAction::StopPreview;
        }
        if word.contains("stoprecord") {
            return ControlAction::StopRecord;
        }
        if word.starts_with("record") {
            return ControlAction::Record;
        }
        if word.contains("moving") {
            return ControlAction::Moving;
        }
        if word.contains("status") {
            return ControlAction::Status;
        }
        ControlAction::Unknown(raw.to_string())
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            ControlAction::Status | ControlAction::Moving | ControlAction::Unknown(_)
        )
    }

    /// Apply the action's effect to the store. Every effect is idempotent.
    pub fn apply(&self, store: &dyn StateStore) -> Result<()> {
        match self {
            ControlAction::Resume => store.clear_flag(Flag::Pause),
            ControlAction::Pause => store.set_flag(Flag::Pause),
            ControlAction::Extend => store.set_flag(Flag::Extend),
            ControlAction::Bandwidth(kbps) => {
                store.set_value(Value::Bandwidth, &format!("{kbps}\n"))
            }
            ControlAction::Preview => store.set_flag(Flag::Webstream),
            ControlAction::StopPreview => store.clear_flag(Flag::Webstream),
            ControlAction::Record => store.set_flag(Flag::Recording),
            ControlAction::StopRecord => store.clear_flag(Flag::Recording),
            ControlAction::Moving | ControlAction::Status => Ok(()),
            ControlAction::Unknown(word) => {
                tracing::debug!(action = %word, "ignoring unknown control action");
                Ok(())
            }
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlAction::Resume => f.write_str("resume"),
            ControlAction::Pause => f.write_str("pause"),
            ControlAction::Extend => f.write_str("extend"),
            ControlAction::Bandwidth(kbps) => write!(f, "bandwidth{kbps}"),
            ControlAction::Preview => f.write_str("preview"),
            ControlAction::StopPreview => f.write_str("stoppreview"),
            ControlAction::Record => f.write_str("record"),
            ControlAction::StopRecord => f.write_str("stoprecord"),
            ControlAction::Moving => f.write_str("moving"),
            ControlAction::Status => f.write_str("status"),
            ControlAction::Unknown(word) => f.write_str(word),
        }
    }
}
