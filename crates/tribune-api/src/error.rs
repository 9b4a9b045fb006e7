use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

/// Handler-level error taxonomy. Every variant maps to a status code plus a
/// `{"error": "..."}` body at the boundary; nothing propagates unhandled.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, (*msg).to_string()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, (*msg).to_string()),
            ApiError::Internal(source) => {
                error!("Internal error: {source:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::Validation("bad".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Forbidden.into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::NotFound("missing").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
