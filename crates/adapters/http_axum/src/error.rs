//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use casahub_domain::error::HubError;

/// JSON error body returned by all endpoints.
#[derive(Serialize)]
struct ReasonBody {
    reason: String,
}

/// Maps hub failures onto HTTP responses.
pub enum ApiError {
    /// A hub operation failed.
    Hub(HubError),
    /// The command kind in the request path is not one the hub knows.
    UnknownCommandKind(String),
}

impl From<HubError> for ApiError {
    fn from(err: HubError) -> Self {
        Self::Hub(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, reason) = match self {
            Self::Hub(err) => match &err {
                HubError::NotFound(_) => (
                    StatusCode::NOT_FOUND,
                    "Device not found or not recognised.".to_string(),
                ),
                HubError::UnsupportedCommand { .. } => (StatusCode::NOT_FOUND, err.to_string()),
                HubError::MissingParameter { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
                HubError::Discovery { .. }
                | HubError::Describe { .. }
                | HubError::Status { .. }
                | HubError::Execution { .. } => {
                    tracing::error!(error = %err, "provider failure");
                    (StatusCode::BAD_GATEWAY, err.to_string())
                }
            },
            Self::UnknownCommandKind(kind) => (
                StatusCode::BAD_REQUEST,
                format!("unknown command kind '{kind}'"),
            ),
        };

        (status, Json(ReasonBody { reason })).into_response()
    }
}
