use axum::extract::State;
use axum::Json;
use castctl_core::book::{self, ScheduleBook};
use castctl_core::schedule::{self, parse_timestamp};
use castctl_core::types::ScheduleKind;
use castctl_core::CastError;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

fn timestamp(text: &str) -> Result<DateTime<Utc>, CastError> {
    parse_timestamp(text).ok_or_else(|| CastError::InvalidTimestamp(text.to_string()))
}

/// GET /api/schedule — normalized schedule, earliest first.
pub async fn get_schedule(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let result = tokio::task::spawn_blocking(move || {
        let book = ScheduleBook::load(store.as_ref())?;
        Ok::<_, CastError>(serde_json::json!(schedule::normalize(book.rows())))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct ScheduleBody {
    #[serde(default)]
    pub kind: ScheduleKind,
    pub org: String,
    /// Defaults to now, rounded down to five minutes.
    pub start: Option<String>,
    /// Takes precedence over `run_time`.
    pub stop: Option<String>,
    pub run_time: Option<String>,
}

/// POST /api/schedule — replace an org's window.
pub async fn create_window(
    State(app): State<AppState>,
    Json(body): Json<ScheduleBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    if body.org.trim().is_empty() {
        return Err(AppError::bad_request("org is required"));
    }

    let start = match body.start.as_deref() {
        Some(text) => timestamp(text)?,
        None => book::default_start(Utc::now()),
    };
    let stop = match (body.stop.as_deref(), body.run_time.as_deref()) {
        (Some(text), _) => timestamp(text)?,
        (None, run_time) => start + book::parse_run_time(run_time.unwrap_or(book::DEFAULT_RUN_TIME))?,
    };
    if stop <= start {
        return Err(AppError::bad_request("stop must be after start"));
    }

    let store = app.store.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut book = ScheduleBook::load(store.as_ref())?;
        book.schedule_window(body.kind, start, stop, &body.org);
        book.save(store.as_ref())?;
        tracing::info!(org = %body.org, kind = %body.kind, "window scheduled");
        Ok::<_, CastError>(serde_json::json!({
            "org": body.org.trim().to_lowercase(),
            "kind": body.kind,
            "start": schedule::format_timestamp(start),
            "stop": schedule::format_timestamp(stop),
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify("schedule");
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct ExtendBody {
    pub org: String,
    pub stop: String,
}

/// POST /api/schedule/extend — move an org's stop time.
pub async fn extend_window(
    State(app): State<AppState>,
    Json(body): Json<ExtendBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let stop = timestamp(&body.stop)?;

    let store = app.store.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut book = ScheduleBook::load(store.as_ref())?;
        let moved = book.extend(&body.org, stop)?;
        book.save(store.as_ref())?;
        tracing::info!(org = %body.org, moved, "window extended");
        Ok::<_, CastError>(serde_json::json!({
            "org": body.org.trim().to_lowercase(),
            "stop": schedule::format_timestamp(stop),
            "moved": moved,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify("schedule");
    Ok(Json(result))
}
