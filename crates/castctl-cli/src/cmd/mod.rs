pub mod action;
pub mod camera;
pub mod init;
pub mod schedule;
pub mod serve;
pub mod status;
pub mod watch;

use crate::client::ControlClient;
use anyhow::Context;
use castctl_core::camera::CameraEndpoint;
use castctl_core::config::Config;
use castctl_core::store::FileStore;
use std::path::Path;

pub(crate) fn load_config(root: &Path) -> anyhow::Result<Config> {
    Config::load_or_default(root).context("failed to load .castctl/config.yaml")
}

/// The flag store of the project at `root`.
pub(crate) fn local_store(root: &Path) -> anyhow::Result<FileStore> {
    let config = load_config(root)?;
    Ok(FileStore::new(config.status_dir(root)))
}

/// Client for `url`, or for the local server on the configured port.
pub(crate) fn control_client(root: &Path, url: Option<&str>) -> anyhow::Result<ControlClient> {
    let config = load_config(root)?;
    let base = url
        .map(str::to_string)
        .unwrap_or_else(|| format!("http://localhost:{}", config.server.port));
    ControlClient::new(base, CameraEndpoint::from(&config.camera))
}
