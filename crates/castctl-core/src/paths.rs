use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const CASTCTL_DIR: &str = ".castctl";
pub const CONFIG_FILE: &str = ".castctl/config.yaml";

/// Default flag directory, relative to the project root.
pub const DEFAULT_STATUS_DIR: &str = "status";

// ---------------------------------------------------------------------------
// Flag and value file names inside the status directory
// ---------------------------------------------------------------------------

pub const PAUSE_FLAG: &str = "pause";
pub const EXTEND_FLAG: &str = "extend";
pub const WEBSTREAM_FLAG: &str = "webstream";
pub const RECORD_FLAG: &str = "audio_record";

pub const SCHEDULE_FILE: &str = "status";
pub const BANDWIDTH_FILE: &str = "bandwidth";
pub const PRESET_FILE: &str = "preset";
pub const VIEWERS_FILE: &str = "watching";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn castctl_dir(root: &Path) -> PathBuf {
    root.join(CASTCTL_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve the status directory: absolute paths are kept, relative ones
/// hang off the project root.
pub fn status_dir(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}

pub fn schedule_path(status_dir: &Path) -> PathBuf {
    status_dir.join(SCHEDULE_FILE)
}

pub fn pause_flag_path(status_dir: &Path) -> PathBuf {
    status_dir.join(PAUSE_FLAG)
}
