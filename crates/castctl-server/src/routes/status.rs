use axum::extract::State;
use axum::Json;
use castctl_core::snapshot;
use chrono::{Local, Utc};

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/status — the panel's view computed server-side at request time.
pub async fn get_status(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let result = tokio::task::spawn_blocking(move || {
        let snap = snapshot::read_snapshot(store.as_ref(), "status")?;
        let now = Utc::now();
        let derived = snap.derive(now);
        let display = castctl_core::display::present(&derived, snap.button_paused);
        Ok::<_, castctl_core::CastError>(serde_json::json!({
            "derived": derived,
            "display": display,
            "status_text": display.status_text(),
            "next_text": display.next_text(now, &Local),
            "extend_visible": display.extend_visible(),
            "toggle": display.toggle(),
            "snapshot": snap,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
