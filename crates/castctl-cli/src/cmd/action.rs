use super::{control_client, local_store};
use crate::cmd::status::print_status;
use anyhow::Context;
use castctl_core::snapshot;
use std::path::Path;

/// Send one control word, locally against the flag files or to a server.
pub fn run(root: &Path, action: &str, url: Option<&str>, json: bool) -> anyhow::Result<()> {
    let snap = match url {
        Some(url) => {
            let client = control_client(root, Some(url))?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(client.fetch(action))?
        }
        None => {
            let store = local_store(root)?;
            snapshot::handle_action(&store, action)
                .with_context(|| format!("failed to apply '{action}'"))?
        }
    };
    print_status(&snap, json)
}
