use super::control_client;
use clap::Subcommand;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand definition
// ---------------------------------------------------------------------------

#[derive(Subcommand, Debug)]
pub enum CameraSubcommand {
    /// Recall a stored camera position
    Preset {
        /// Preset number
        preset: i64,
    },
    /// Drive pan/tilt back to home
    Rehome,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcommand: CameraSubcommand) -> anyhow::Result<()> {
    let client = control_client(root, None)?;
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async {
        match subcommand {
            CameraSubcommand::Preset { preset } => client.recall_preset(preset).await,
            CameraSubcommand::Rehome => client.rehome().await,
        }
    });
    // Camera commands are fire and forget.
    if let Err(e) = result {
        tracing::warn!(error = %format!("{e:#}"), "camera command failed");
    }
    Ok(())
}
