pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router over the flag files of the project at `root`.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf) -> Router {
    router_with_state(state::AppState::new(root))
}

/// Build the Router over an explicit state, e.g. one backed by a
/// `MemoryStore`.
pub fn router_with_state(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Control endpoint polled by the panel
        .route("/control", get(routes::control::control))
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Status
        .route("/api/status", get(routes::status::get_status))
        // Schedule
        .route("/api/schedule", get(routes::schedule::get_schedule))
        .route("/api/schedule", post(routes::schedule::create_window))
        .route(
            "/api/schedule/extend",
            post(routes::schedule::extend_window),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the control server.
pub async fn serve(root: PathBuf, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, listener, open_browser).await
}

/// Start the control server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(
    root: PathBuf,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(root);

    tracing::info!("castctl control server listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}/api/status");
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, "could not open browser");
        }
    }

    axum::serve(listener, app).await?;
    Ok(())
}
