use crate::error::Result;
use crate::{io, paths};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Boolean switches: present means on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Pause,
    Extend,
    Webstream,
    Recording,
}

impl Flag {
    pub fn file_name(self) -> &'static str {
        match self {
            Flag::Pause => paths::PAUSE_FLAG,
            Flag::Extend => paths::EXTEND_FLAG,
            Flag::Webstream => paths::WEBSTREAM_FLAG,
            Flag::Recording => paths::RECORD_FLAG,
        }
    }
}

/// Text values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    Schedule,
    Bandwidth,
    Preset,
    Viewers,
}

impl Value {
    pub fn file_name(self) -> &'static str {
        match self {
            Value::Schedule => paths::SCHEDULE_FILE,
            Value::Bandwidth => paths::BANDWIDTH_FILE,
            Value::Preset => paths::PRESET_FILE,
            Value::Viewers => paths::VIEWERS_FILE,
        }
    }
}

// ---------------------------------------------------------------------------
// StateStore
// ---------------------------------------------------------------------------

/// Key-value view of the appliance's persisted switches.
///
/// Setting a flag that is already set and clearing one that is already clear
/// are both no-ops.
pub trait StateStore: Send + Sync {
    fn flag(&self, flag: Flag) -> Result<bool>;
    fn set_flag(&self, flag: Flag) -> Result<()>;
    fn clear_flag(&self, flag: Flag) -> Result<()>;
    fn value(&self, key: Value) -> Result<Option<String>>;
    fn set_value(&self, key: Value, data: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// One file per key inside the status directory. A flag is on exactly when
/// its file exists; its content is irrelevant.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory plus empty schedule and viewer files.
    pub fn init(&self) -> Result<()> {
        io::ensure_dir(&self.dir)?;
        io::write_if_missing(&self.dir.join(paths::SCHEDULE_FILE), b"")?;
        io::write_if_missing(&self.dir.join(paths::VIEWERS_FILE), b"")?;
        Ok(())
    }
}

impl StateStore for FileStore {
    fn flag(&self, flag: Flag) -> Result<bool> {
        Ok(self.dir.join(flag.file_name()).exists())
    }

    fn set_flag(&self, flag: Flag) -> Result<()> {
        let path = self.dir.join(flag.file_name());
        if !path.exists() {
            io::touch(&path)?;
            tracing::debug!(flag = flag.file_name(), "flag set");
        }
        Ok(())
    }

    fn clear_flag(&self, flag: Flag) -> Result<()> {
        let path = self.dir.join(flag.file_name());
        if path.exists() {
            io::remove_if_exists(&path)?;
            tracing::debug!(flag = flag.file_name(), "flag cleared");
        }
        Ok(())
    }

    fn value(&self, key: Value) -> Result<Option<String>> {
        match std::fs::read_to_string(self.dir.join(key.file_name())) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_value(&self, key: Value, data: &str) -> Result<()> {
        io::atomic_write(&self.dir.join(key.file_name()), data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-process store with the same semantics, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    flags: Mutex<HashSet<Flag>>,
    values: Mutex<HashMap<Value, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flag_count(&self) -> usize {
        self.flags.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl StateStore for MemoryStore {
    fn flag(&self, flag: Flag) -> Result<bool> {
        Ok(self
            .flags
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&flag))
    }

    fn set_flag(&self, flag: Flag) -> Result<()> {
        self.flags
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(flag);
        Ok(())
    }

    fn clear_flag(&self, flag: Flag) -> Result<()> {
        self.flags
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&flag);
        Ok(())
    }

    fn value(&self, key: Value) -> Result<Option<String>> {
        Ok(self
            .values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
            .cloned())
    }

    fn set_value(&self, key: Value, data: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, data.to_string());
        Ok(())
    }
}
