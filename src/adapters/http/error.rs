use crate::domain::model::ErrorResponse;
use crate::utils::error::{ErrorCategory, PredictorError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

impl IntoResponse for PredictorError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match self.category() {
            ErrorCategory::Client => tracing::warn!("Rejected prediction request: {}", self),
            _ => tracing::error!(
                "❌ Prediction failed: {} (Category: {:?})",
                self,
                self.category()
            ),
        }

        let body = ErrorResponse {
            status: "error".to_string(),
            error: self.user_friendly_message(),
        };
        (status, Json(body)).into_response()
    }
}
