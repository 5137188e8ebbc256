//! Error types for the Observer API server.
//!
//! Every handler returns [`ObserverError`] on failure. It renders as a JSON
//! body `{ "error": .., "status": .. }` with the matching HTTP status.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::warn;

/// Errors that can occur in the Observer API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// Nothing to show yet: no session, no outcome, or no profile.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request named something that does not exist, like a light.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The session already ended or is stopping.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A response could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl ObserverError {
    /// HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, "Observer request failed");
        }
        let body = ErrorBody {
            error: self.to_string(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}
