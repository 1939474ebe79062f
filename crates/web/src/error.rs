use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug)]
pub enum ApiError {
    /// POST without a live session cookie.
    NoSession,
    /// The action needs results that the session does not have yet.
    NoResults,
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NoSession => (
                StatusCode::BAD_REQUEST,
                "session missing or expired; reload the page to start again",
            )
                .into_response(),
            ApiError::NoResults => (
                StatusCode::CONFLICT,
                "there are no results to save yet",
            )
                .into_response(),
            ApiError::Internal(err) => {
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
