//! The `watch` loop: one request per tick, render the latest answer.

use crate::client::ControlClient;
use castctl_core::display::DisplayStatus;
use castctl_core::session::{ControlSession, SessionUpdate};
use chrono::{DateTime, Local, TimeZone, Utc};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// Send the session's next poll action and fold the answer in.
pub async fn poll_once(
    client: &ControlClient,
    session: &mut ControlSession,
) -> anyhow::Result<SessionUpdate> {
    let action = session.next_poll_action();
    let snap = client.fetch(action).await?;
    Ok(session.apply(&snap, Utc::now()))
}

/// One rendered frame: headline, countdown line and the side panel.
pub fn render<Tz: TimeZone>(
    display: &DisplayStatus,
    session: &ControlSession,
    now: DateTime<Utc>,
    tz: &Tz,
) -> String {
    let mut lines = vec![session.headline().unwrap_or("Unknown").to_string()];
    let next = display.next_text(now, tz);
    if !next.is_empty() {
        lines.push(next);
    }

    let mut details = vec![format!("viewers {}", session.viewers())];
    if let Some(kbps) = session.bandwidth() {
        details.push(format!("bandwidth {kbps}"));
    }
    if let Some(preset) = session.highlighted_preset() {
        details.push(format!("preset {preset}"));
    }
    if session.recording() {
        details.push("recording".to_string());
    }
    if session.preview_open() {
        details.push("preview".to_string());
    }
    lines.push(details.join(" | "));
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Operator input
// ---------------------------------------------------------------------------

/// A line typed into the watch panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand {
    /// Press the pause/resume toggle; the word sent depends on its state.
    Toggle,
    Extend,
    Preview,
    Preset(i64),
    Rehome,
    /// Any other word goes to the control endpoint as-is.
    Send(String),
}

impl PanelCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let first = words.next()?.to_lowercase();
        let cmd = match first.as_str() {
            "t" | "toggle" => PanelCommand::Toggle,
            "extend" => PanelCommand::Extend,
            "preview" => PanelCommand::Preview,
            "rehome" => PanelCommand::Rehome,
            "preset" => match words.next().and_then(|n| n.parse().ok()) {
                Some(n) => PanelCommand::Preset(n),
                None => return None,
            },
            "bandwidth" => match words.next() {
                Some(kbps) => PanelCommand::Send(format!("bandwidth{kbps}")),
                None => return None,
            },
            _ => PanelCommand::Send(first),
        };
        Some(cmd)
    }
}

async fn handle_command(
    client: &ControlClient,
    session: &mut ControlSession,
    cmd: PanelCommand,
) -> anyhow::Result<Option<SessionUpdate>> {
    let action = match cmd {
        PanelCommand::Toggle => match session.last_display() {
            Some(display) => display.toggle().press_action().to_string(),
            None => return Ok(None),
        },
        PanelCommand::Extend => {
            if !session.last_display().is_some_and(|d| d.extend_visible()) {
                tracing::warn!("nothing to extend while stopped");
                return Ok(None);
            }
            "extend".to_string()
        }
        PanelCommand::Preview => {
            let open = session.toggle_preview();
            tracing::info!(open, "preview toggled");
            return Ok(None);
        }
        PanelCommand::Preset(n) => {
            session.select_preset(n, Instant::now());
            let client = client.clone();
            tokio::spawn(async move {
                if let Err(e) = client.recall_preset(n).await {
                    tracing::warn!(error = %format!("{e:#}"), "preset recall failed");
                }
            });
            return Ok(None);
        }
        PanelCommand::Rehome => {
            let client = client.clone();
            tokio::spawn(async move {
                if let Err(e) = client.rehome().await {
                    tracing::warn!(error = %format!("{e:#}"), "rehome failed");
                }
            });
            return Ok(None);
        }
        PanelCommand::Send(word) => word,
    };

    let snap = client.fetch(&action).await?;
    Ok(Some(session.apply(&snap, Utc::now())))
}

// ---------------------------------------------------------------------------
// Loop
// ---------------------------------------------------------------------------

/// Poll until `shutdown` resolves, printing a frame whenever it changes.
/// Operator lines arrive on `commands`. Failed requests are logged and the
/// next tick simply tries again. On the way out `stoppreview` is sent once,
/// best effort.
pub async fn run(
    client: ControlClient,
    mut session: ControlSession,
    interval: Duration,
    json: bool,
    mut commands: mpsc::Receiver<String>,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut last_frame = String::new();
    let mut input_open = true;
    loop {
        let result = tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => poll_once(&client, &mut session).await.map(Some),
            line = commands.recv(), if input_open => match line {
                Some(line) => match PanelCommand::parse(&line) {
                    Some(cmd) => handle_command(&client, &mut session, cmd).await,
                    None => Ok(None),
                },
                None => {
                    input_open = false;
                    Ok(None)
                }
            },
        };

        match result {
            Ok(Some(update)) => {
                let frame = if json {
                    serde_json::to_string(&update.display)?
                } else {
                    render(&update.display, &session, Utc::now(), &Local)
                };
                if frame != last_frame {
                    println!("{frame}");
                    if !json {
                        println!();
                    }
                    last_frame = frame;
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %format!("{e:#}"), "request failed"),
        }
    }

    // Always sent: the in-loop stop may have failed after `streaming` cleared.
    if let Err(e) = client.fetch(session.teardown_action()).await {
        tracing::warn!(error = %format!("{e:#}"), "could not stop preview");
    }
    Ok(())
}
