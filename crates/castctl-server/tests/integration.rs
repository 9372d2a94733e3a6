use axum::http::StatusCode;
use castctl_core::schedule::{format_timestamp, parse_timestamp};
use castctl_core::store::{FileStore, MemoryStore, StateStore, Value};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Bootstrap a project with an empty status directory.
fn init_project(dir: &TempDir) {
    castctl_core::config::Config::new("test-station")
        .save(dir.path())
        .unwrap();
    FileStore::new(dir.path().join("status")).init().unwrap();
}

fn status_file(dir: &TempDir, name: &str) -> std::path::PathBuf {
    dir.path().join("status").join(name)
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a POST request with a JSON body via `oneshot` and return (status, parsed JSON body).
async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

// ---------------------------------------------------------------------------
// /control
// ---------------------------------------------------------------------------

#[tokio::test]
async fn control_status_on_empty_project() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = castctl_server::build_router(dir.path().to_path_buf());

    let (status, json) = get(app, "/control?action=status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["action"], "status");
    assert_eq!(json["buttonPaused"], false);
    assert_eq!(json["schedule"], serde_json::json!([]));
    assert_eq!(json["bandwidth"], "0");
    assert_eq!(json["preset"], "");
    assert_eq!(json["recording"], false);
    assert_eq!(json["viewers"], 0);
}

#[tokio::test]
async fn control_without_action_echoes_empty() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = castctl_server::build_router(dir.path().to_path_buf());

    let (status, json) = get(app, "/control").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["action"], "");
}

#[tokio::test]
async fn control_pause_and_resume_toggle_flag_file() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = castctl_server::build_router(dir.path().to_path_buf());

    let (_, json) = get(app.clone(), "/control?action=pause").await;
    assert_eq!(json["buttonPaused"], true);
    assert!(status_file(&dir, "pause").exists());

    let (_, json) = get(app.clone(), "/control?action=pause").await;
    assert_eq!(json["buttonPaused"], true);

    let (_, json) = get(app.clone(), "/control?action=resume").await;
    assert_eq!(json["buttonPaused"], false);
    assert!(!status_file(&dir, "pause").exists());

    let (status, _) = get(app, "/control?action=resume").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn control_flag_actions() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = castctl_server::build_router(dir.path().to_path_buf());

    get(app.clone(), "/control?action=extend").await;
    assert!(status_file(&dir, "extend").exists());

    get(app.clone(), "/control?action=preview").await;
    assert!(status_file(&dir, "webstream").exists());
    get(app.clone(), "/control?action=stoppreview").await;
    assert!(!status_file(&dir, "webstream").exists());

    let (_, json) = get(app.clone(), "/control?action=record").await;
    assert_eq!(json["recording"], true);
    let (_, json) = get(app.clone(), "/control?action=stoprecord").await;
    assert_eq!(json["recording"], false);

    let (_, json) = get(app, "/control?action=bandwidth1500").await;
    assert_eq!(json["bandwidth"], "1500");
    assert_eq!(
        std::fs::read_to_string(status_file(&dir, "bandwidth")).unwrap(),
        "1500\n"
    );
}

#[tokio::test]
async fn control_unknown_action_is_a_read() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = castctl_server::build_router(dir.path().to_path_buf());

    let (status, json) = get(app, "/control?action=selfdestruct").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["action"], "selfdestruct");
    let entries = std::fs::read_dir(dir.path().join("status")).unwrap().count();
    // only the files created by init
    assert_eq!(entries, 2);
}

#[tokio::test]
async fn control_reads_appliance_files() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    std::fs::write(
        status_file(&dir, "status"),
        "start,2024-03-10 09:00:00Z,north_ward\r\nstop,2024-03-10 10:10:00Z,north_ward\r\n",
    )
    .unwrap();
    std::fs::write(status_file(&dir, "watching"), "3\n17\n").unwrap();
    std::fs::write(status_file(&dir, "preset"), "2\n").unwrap();
    std::fs::write(status_file(&dir, "audio_record"), "").unwrap();
    let app = castctl_server::build_router(dir.path().to_path_buf());

    let (_, json) = get(app, "/control?action=status").await;
    assert_eq!(
        json["schedule"],
        serde_json::json!([
            ["start", "2024-03-10 09:00:00Z", "north_ward"],
            ["stop", "2024-03-10 10:10:00Z", "north_ward"]
        ])
    );
    assert_eq!(json["viewers"], 17);
    assert_eq!(json["preset"], "2");
    assert_eq!(json["recording"], true);
}

#[tokio::test]
async fn control_over_memory_store() {
    let store = Arc::new(MemoryStore::new());
    let state = castctl_server::state::AppState::with_store(
        "/nonexistent".into(),
        "/nonexistent/status".into(),
        store.clone(),
    );
    let app = castctl_server::router_with_state(state);

    let (status, json) = get(app, "/control?action=PAUSE").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["buttonPaused"], true);
    assert_eq!(store.flag_count(), 1);
}

// ---------------------------------------------------------------------------
// /api/status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_merges_manual_pause() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let now = Utc::now();
    let text = format!(
        "start,{},north_ward\nstop,{},north_ward\n",
        format_timestamp(now - Duration::minutes(10)),
        format_timestamp(now + Duration::minutes(30)),
    );
    std::fs::write(status_file(&dir, "status"), text).unwrap();
    std::fs::write(status_file(&dir, "pause"), "").unwrap();
    let app = castctl_server::build_router(dir.path().to_path_buf());

    let (status, json) = get(app, "/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["derived"]["state"], "start");
    assert_eq!(json["derived"]["org"], "North Ward");
    assert_eq!(json["display"]["state"], "paused");
    assert_eq!(json["display"]["manualPause"], true);
    assert_eq!(json["status_text"], "Broadcast paused (North Ward)");
    assert_eq!(json["toggle"], "resume");
    assert_eq!(json["extend_visible"], true);
    assert!(json["next_text"].as_str().unwrap().starts_with("Stopping in "));
}

#[tokio::test]
async fn status_of_empty_schedule() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = castctl_server::build_router(dir.path().to_path_buf());

    let (_, json) = get(app, "/api/status").await;
    assert_eq!(json["derived"]["state"], "unknown");
    assert_eq!(json["derived"]["nextTime"], 0);
    assert_eq!(json["status_text"], serde_json::Value::Null);
    assert_eq!(json["next_text"], "");
}

// ---------------------------------------------------------------------------
// /api/schedule
// ---------------------------------------------------------------------------

#[tokio::test]
async fn schedule_window_then_list() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = castctl_server::build_router(dir.path().to_path_buf());

    let (status, json) = post_json(
        app.clone(),
        "/api/schedule",
        serde_json::json!({
            "kind": "broadcast",
            "org": "North_Ward",
            "start": "2024-03-10 09:00:00Z",
            "stop": "2024-03-10 10:10:00Z",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["org"], "north_ward");

    let written = std::fs::read_to_string(status_file(&dir, "status")).unwrap();
    assert_eq!(
        written,
        "broadcast,2024-03-10 09:00:00Z,north_ward\nstop,2024-03-10 10:10:00Z,north_ward\n"
    );

    let (status, json) = get(app, "/api/schedule").await;
    assert_eq!(status, StatusCode::OK);
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["action"], "broadcast");
    assert_eq!(rows[0]["org"], "North Ward");
}

#[tokio::test]
async fn schedule_window_from_run_time() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = castctl_server::build_router(dir.path().to_path_buf());

    let (status, json) = post_json(
        app,
        "/api/schedule",
        serde_json::json!({
            "org": "ward",
            "start": "2024-03-10 09:00:00Z",
            "run_time": "0:45:00",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["kind"], "start");
    assert_eq!(json["stop"], "2024-03-10 09:45:00Z");
}

#[tokio::test]
async fn schedule_rejects_bad_input() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = castctl_server::build_router(dir.path().to_path_buf());

    let (status, json) = post_json(
        app.clone(),
        "/api/schedule",
        serde_json::json!({ "org": "ward", "start": "tomorrow-ish" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("tomorrow-ish"));

    let (status, _) = post_json(
        app.clone(),
        "/api/schedule",
        serde_json::json!({
            "org": "ward",
            "start": "2024-03-10 09:00:00Z",
            "stop": "2024-03-10 08:00:00Z",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        app,
        "/api/schedule",
        serde_json::json!({ "org": " ", "run_time": "1:00:00" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn extend_moves_stop() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = castctl_server::build_router(dir.path().to_path_buf());
    post_json(
        app.clone(),
        "/api/schedule",
        serde_json::json!({
            "org": "ward",
            "start": "2024-03-10 09:00:00Z",
            "stop": "2024-03-10 10:10:00Z",
        }),
    )
    .await;

    let (status, json) = post_json(
        app,
        "/api/schedule/extend",
        serde_json::json!({ "org": "Ward", "stop": "2024-03-10 10:40:00Z" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["moved"], 1);

    let store = FileStore::new(dir.path().join("status"));
    let text = store.value(Value::Schedule).unwrap().unwrap();
    assert!(text.contains("stop,2024-03-10 10:40:00Z,ward"));
    assert!(!text.contains("10:10:00Z"));
    assert!(parse_timestamp("2024-03-10 10:40:00Z").is_some());
}

#[tokio::test]
async fn extend_unscheduled_org_is_404() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = castctl_server::build_router(dir.path().to_path_buf());

    let (status, json) = post_json(
        app,
        "/api/schedule/extend",
        serde_json::json!({ "org": "ghost", "stop": "2024-03-10 10:40:00Z" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("ghost"));
}
