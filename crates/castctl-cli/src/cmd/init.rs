use anyhow::Context;
use castctl_core::{config::Config, io, paths, store::FileStore};
use std::path::Path;

pub fn run(root: &Path, station: Option<&str>) -> anyhow::Result<()> {
    let station_name = station.map(str::to_string).unwrap_or_else(|| {
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "castctl".to_string())
    });

    println!("Initializing castctl in: {}", root.display());

    let dir = paths::castctl_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config_path = paths::config_path(root);
    let config = if !config_path.exists() {
        let cfg = Config::new(&station_name);
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
        cfg
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
        Config::load(root).context("failed to read config.yaml")?
    };

    let status_dir = config.status_dir(root);
    FileStore::new(&status_dir)
        .init()
        .with_context(|| format!("failed to create {}", status_dir.display()))?;
    println!("  status:  {}", status_dir.display());

    Ok(())
}
