//! Error types for the API server.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every
//! error body has the shape `{"success": false, "error": ..., "status": ...}`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use civic_core::GameError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request was malformed or missing a required field.
    #[error("{0}")]
    Validation(String),

    /// A referenced decision or choice does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The game is in a state that does not allow the request.
    #[error("{0}")]
    InvalidState(String),

    /// The decision deck is exhausted.
    #[error("No more decisions available")]
    NoDecision,

    /// An internal error occurred.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::NoDecision => StatusCode::NOT_FOUND,
            Self::InvalidState(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::Validation(msg) => Self::Validation(msg),
            GameError::NotFound { .. } => Self::NotFound(err.to_string()),
            GameError::AlreadyEnded => Self::InvalidState(err.to_string()),
            GameError::Content(_) | GameError::Catalog(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }

        let body = serde_json::json!({
            "success": false,
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_errors_map_to_statuses() {
        let cases = [
            (GameError::Validation("x".to_owned()), StatusCode::BAD_REQUEST),
            (
                GameError::NotFound {
                    kind: "decision",
                    id: "decision_99".to_owned(),
                },
                StatusCode::NOT_FOUND,
            ),
            (GameError::AlreadyEnded, StatusCode::CONFLICT),
            (
                GameError::Content("empty".to_owned()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn not_found_message_names_the_key() {
        let err = ApiError::from(GameError::NotFound {
            kind: "choice",
            id: "choice_1_9".to_owned(),
        });
        assert_eq!(err.to_string(), "choice not found: choice_1_9");
    }
}
