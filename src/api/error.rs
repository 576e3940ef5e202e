use crate::error::LeaderboardError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Handler error rendered as `{"error": "..."}`
#[derive(Debug)]
pub enum ApiError {
    BadRequest(&'static str),
    Service(LeaderboardError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(e) if e.is_timeout() => StatusCode::REQUEST_TIMEOUT,
            ApiError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.to_string(),
            ApiError::Service(e) if e.is_timeout() => "request cancelled".to_string(),
            ApiError::Service(e) => e.to_string(),
        }
    }
}

impl From<LeaderboardError> for ApiError {
    fn from(e: LeaderboardError) -> Self {
        ApiError::Service(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("❌ Request failed: {}", self.message());
        } else {
            log::warn!("⚠️  Request rejected ({}): {}", status.as_u16(), self.message());
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}
