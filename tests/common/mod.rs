#![allow(dead_code)]

use house_price_service::core::forest::ForestParams;
use house_price_service::{
    create_router, train_model, AppState, ModelArtifact, PredictionService, RngSource,
    TrainingOptions,
};
use serde_json::{json, Value};
use std::sync::OnceLock;

pub fn small_options() -> TrainingOptions {
    TrainingOptions {
        n_samples: 400,
        forest: ForestParams {
            n_estimators: 10,
            max_depth: 10,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// 同一個測試二進位檔內共用一個已訓練模型
pub fn shared_artifact() -> ModelArtifact {
    static ARTIFACT: OnceLock<ModelArtifact> = OnceLock::new();
    ARTIFACT
        .get_or_init(|| train_model(&small_options()).expect("training should succeed"))
        .clone()
}

pub fn test_router(seed: Option<u64>) -> axum::Router {
    let service = PredictionService::from_artifact(shared_artifact(), RngSource::from_seed(seed));
    create_router(AppState::new(service))
}

pub fn example_body() -> Value {
    json!({
        "bedrooms": 3,
        "bathrooms": 2,
        "squareFeet": 2000,
        "lotSize": 0.5,
        "yearBuilt": 2010,
        "neighborhood": "downtown",
        "condition": "good",
        "hasGarage": true,
        "hasPool": false
    })
}
