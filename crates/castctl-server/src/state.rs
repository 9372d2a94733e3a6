use castctl_core::config::Config;
use castctl_core::paths;
use castctl_core::store::{FileStore, StateStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::broadcast;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub status_dir: PathBuf,
    pub store: Arc<dyn StateStore>,
    /// Carries what changed: `files` from the watcher, otherwise the route.
    pub event_tx: broadcast::Sender<&'static str>,
}

impl AppState {
    /// State backed by the flag files under the configured status directory.
    pub fn new(root: PathBuf) -> Self {
        let config = Config::load_or_default(&root).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "unreadable config, using defaults");
            Config::default()
        });
        let status_dir = config.status_dir(&root);
        let store = Arc::new(FileStore::new(status_dir.clone()));
        Self::with_store(root, status_dir, store)
    }

    /// State over an arbitrary store. The file watcher still looks at
    /// `status_dir`; with a non-file store it simply never fires.
    pub fn with_store(root: PathBuf, status_dir: PathBuf, store: Arc<dyn StateStore>) -> Self {
        let (tx, _) = broadcast::channel(64);
        let state = Self {
            root,
            status_dir,
            store,
            event_tx: tx.clone(),
        };

        // Watch the schedule file and pause flag so edits made by the
        // scheduler scripts reach SSE clients too.
        // Guard: only spawn if inside a Tokio runtime (skipped in sync unit tests).
        if tokio::runtime::Handle::try_current().is_ok() {
            let dir = state.status_dir.clone();
            tokio::spawn(async move {
                let mut last = None::<(Option<SystemTime>, Option<SystemTime>)>;
                loop {
                    tokio::time::sleep(std::time::Duration::from_millis(800)).await;
                    let current = watch_signature(&dir).await;
                    if last != Some(current) {
                        last = Some(current);
                        let _ = tx.send("files");
                    }
                }
            });
        }

        state
    }

    /// Tell SSE subscribers something changed. No subscribers is fine.
    pub fn notify(&self, source: &'static str) {
        let _ = self.event_tx.send(source);
    }
}

async fn mtime(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path).await.ok()?.modified().ok()
}

async fn watch_signature(dir: &Path) -> (Option<SystemTime>, Option<SystemTime>) {
    (
        mtime(&paths::schedule_path(dir)).await,
        mtime(&paths::pause_flag_path(dir)).await,
    )
}
