use super::{control_client, local_store};
use crate::output::print_json;
use anyhow::Context;
use castctl_core::display::present;
use castctl_core::snapshot::{self, ControlSnapshot};
use chrono::{Local, Utc};
use std::path::Path;

pub fn run(root: &Path, url: Option<&str>, json: bool) -> anyhow::Result<()> {
    let snap = match url {
        Some(url) => {
            let client = control_client(root, Some(url))?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(client.fetch("status"))?
        }
        None => {
            let store = local_store(root)?;
            snapshot::read_snapshot(&store, "status").context("failed to read status files")?
        }
    };
    print_status(&snap, json)
}

pub(crate) fn print_status(snap: &ControlSnapshot, json: bool) -> anyhow::Result<()> {
    let now = Utc::now();
    let derived = snap.derive(now);
    let display = present(&derived, snap.button_paused);
    let next_text = display.next_text(now, &Local);

    if json {
        return print_json(&serde_json::json!({
            "derived": derived,
            "display": display,
            "status_text": display.status_text(),
            "next_text": next_text,
            "extend_visible": display.extend_visible(),
            "toggle": display.toggle(),
            "snapshot": snap,
        }));
    }

    println!(
        "{}",
        display
            .status_text()
            .unwrap_or_else(|| format!("State: {}", display.state))
    );
    if !next_text.is_empty() {
        println!("{next_text}");
    }
    println!(
        "viewers: {}  bandwidth: {}  recording: {}",
        snap.viewers,
        snap.bandwidth,
        if snap.recording { "on" } else { "off" }
    );
    Ok(())
}
