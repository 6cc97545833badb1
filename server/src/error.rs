//! HTTP error mapping.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use insurspeak_core::CoreError;
use thiserror::Error;
use tracing::{error, warn};

/// Errors returned by request handlers.
///
/// Rendered as `{"detail": "..."}`, the shape the web client reads.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("invalid form data: {0}")]
    Multipart(#[from] MultipartError),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{0} must be valid UTF-8 text")]
    InvalidField(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Core(CoreError::Input(_)) => StatusCode::BAD_REQUEST,
            Self::Core(CoreError::Extraction(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Multipart(e) => e.status(),
            Self::MissingField(_) | Self::InvalidField(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {self}");
        } else {
            warn!("Rejected request ({status}): {self}");
        }

        let body = serde_json::json!({ "detail": self.to_string() });
        (status, Json(body)).into_response()
    }
}
