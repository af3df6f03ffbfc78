use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required files. Please upload all of: {}", .0.join(", "))]
    MissingFiles(Vec<String>),

    #[error("Malformed upload: {0}")]
    BadUpload(String),

    #[error("Analysis completed but produced no results. Check file contents.")]
    NoResults,

    /// Detail is logged, never sent to the client.
    #[error("An internal server error occurred during analysis.")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFiles(_) | ApiError::BadUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::NoResults => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(e) => log::error!("❌ Analysis failed: {:#}", e),
            other => log::warn!("⚠️ Rejected analysis request: {}", other),
        }
        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
