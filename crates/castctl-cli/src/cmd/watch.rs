use super::{control_client, load_config};
use crate::poller;
use castctl_core::session::ControlSession;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

pub fn run(
    root: &Path,
    url: Option<&str>,
    interval_ms: Option<u64>,
    preview: bool,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let client = control_client(root, url)?;
    let interval = interval_ms
        .map(|ms| Duration::from_millis(ms.max(1)))
        .unwrap_or_else(|| config.poll.interval());

    let mut session = ControlSession::new(config.poll.preset_cooldown());
    session.set_preview_open(preview);

    tracing::info!(url = %client.control_url(), ?interval, "watching");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if tx.send(line).await.is_err() {
                    break;
                }
            }
        });

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
        };
        poller::run(client, session, interval, json, rx, shutdown).await
    })
}
