use axum::extract::{Query, State};
use axum::Json;
use castctl_core::action::ControlAction;
use castctl_core::snapshot::{self, ControlSnapshot};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ControlQuery {
    #[serde(default)]
    pub action: String,
}

/// GET /control?action=… — apply one operator action and return the snapshot.
///
/// Unknown actions are not an error; they are answered like `status`.
pub async fn control(
    State(app): State<AppState>,
    Query(query): Query<ControlQuery>,
) -> Result<Json<ControlSnapshot>, AppError> {
    let store = app.store.clone();
    let raw = query.action;
    let mutated = ControlAction::parse(&raw).is_mutation();

    let snap = tokio::task::spawn_blocking(move || snapshot::handle_action(store.as_ref(), &raw))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    if mutated {
        app.notify("control");
    }
    Ok(Json(snap))
}
