use crate::error::{CastError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationConfig {
    #[serde(default = "default_station_name")]
    pub name: String,
}

fn default_station_name() -> String {
    "castctl".to_string()
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            name: default_station_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3141
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Client-side cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Reserved for a preview image panel. The terminal panel does not
    /// draw images, so nothing reads this yet.
    #[serde(default = "default_preview_refresh_ms")]
    pub preview_refresh_ms: u64,
    #[serde(default = "default_preset_cooldown_ms")]
    pub preset_cooldown_ms: u64,
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_preview_refresh_ms() -> u64 {
    333
}

fn default_preset_cooldown_ms() -> u64 {
    1000
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            preview_refresh_ms: default_preview_refresh_ms(),
            preset_cooldown_ms: default_preset_cooldown_ms(),
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }

    pub fn preset_cooldown(&self) -> Duration {
        Duration::from_millis(self.preset_cooldown_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_host")]
    pub host: String,
    #[serde(default = "default_camera_port")]
    pub port: u16,
}

fn default_camera_host() -> String {
    "localhost".to_string()
}

fn default_camera_port() -> u16 {
    8080
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            host: default_camera_host(),
            port: default_camera_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub station: StationConfig,
    /// Flag directory; relative paths hang off the project root.
    #[serde(default = "default_status_dir")]
    pub status_dir: PathBuf,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub camera: CameraConfig,
}

fn default_version() -> u32 {
    1
}

fn default_status_dir() -> PathBuf {
    PathBuf::from(paths::DEFAULT_STATUS_DIR)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            station: StationConfig::default(),
            status_dir: default_status_dir(),
            server: ServerConfig::default(),
            poll: PollConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl Config {
    pub fn new(station_name: impl Into<String>) -> Self {
        Self {
            station: StationConfig {
                name: station_name.into(),
            },
            ..Self::default()
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(CastError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Like [`Config::load`] but an uninitialized root gets the defaults.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Self::load(root) {
            Err(CastError::NotInitialized) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn status_dir(&self, root: &Path) -> PathBuf {
        paths::status_dir(root, &self.status_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_missing_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(CastError::NotInitialized)
        ));
        assert_eq!(Config::load_or_default(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new("North Ward");
        cfg.poll.interval_ms = 500;
        cfg.save(dir.path()).unwrap();
        assert!(dir.path().join(".castctl/config.yaml").exists());
        assert_eq!(Config::load(dir.path()).unwrap(), cfg);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".castctl")).unwrap();
        std::fs::write(
            dir.path().join(".castctl/config.yaml"),
            "station:\n  name: chapel\ncamera:\n  host: 10.0.0.9\n",
        )
        .unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.station.name, "chapel");
        assert_eq!(cfg.camera.host, "10.0.0.9");
        assert_eq!(cfg.camera.port, 8080);
        assert_eq!(cfg.server.port, 3141);
        assert_eq!(cfg.poll.interval(), Duration::from_millis(1000));
        assert_eq!(cfg.poll.preview_refresh_ms, 333);
        assert_eq!(cfg.status_dir(dir.path()), dir.path().join("status"));
    }

    #[test]
    fn absolute_status_dir_is_kept() {
        let cfg = Config {
            status_dir: PathBuf::from("/var/lib/cast/status"),
            ..Config::default()
        };
        assert_eq!(
            cfg.status_dir(Path::new("/srv/project")),
            PathBuf::from("/var/lib/cast/status")
        );
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".castctl")).unwrap();
        std::fs::write(dir.path().join(".castctl/config.yaml"), "poll: [1, 2").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(CastError::Yaml(_))));
    }
}
