use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use castctl_core::CastError;

// ---------------------------------------------------------------------------
// Internal sentinel for explicit 400 errors
// ---------------------------------------------------------------------------

/// Carries an explicit HTTP 400 through the `anyhow::Error` chain for
/// request problems that have no `CastError` variant.
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(b) = self.0.downcast_ref::<BadRequestError>() {
            let body = serde_json::json!({ "error": b.0.clone() });
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }

        let status = match self.0.downcast_ref::<CastError>() {
            Some(CastError::NotInitialized) => StatusCode::BAD_REQUEST,
            Some(CastError::OrgNotScheduled(_)) => StatusCode::NOT_FOUND,
            Some(
                CastError::InvalidRunTime(_)
                | CastError::InvalidTimestamp(_)
                | CastError::InvalidScheduleKind(_),
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            Some(CastError::Io(_) | CastError::Yaml(_)) | None => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
