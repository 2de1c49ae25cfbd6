use crate::adapters::http::AppState;
use crate::core::validator::{parse_body, validate_input};
use crate::domain::model::{HealthResponse, PredictionResponse};
use crate::utils::error::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;

/// `POST /predict`
///
/// 主體以原始位元組接收，由驗證器產生可讀的 400 錯誤訊息
pub async fn predict(State(state): State<AppState>, body: Bytes) -> Result<Json<PredictionResponse>> {
    let data = parse_body(&body)?;
    let input = validate_input(&data)?;

    let prediction = state.service.predict(&input)?;
    tracing::debug!(
        "Predicted {} (confidence {}) for {} sqft in {}",
        prediction.predicted_price,
        prediction.confidence,
        input.square_feet,
        input.neighborhood
    );

    Ok(Json(PredictionResponse::success(prediction, input)))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: state.service.is_model_loaded(),
    })
}
