mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Datelike, Local, Months};
use common::{example_body, shared_artifact, test_router};
use house_price_service::core::Regressor;
use house_price_service::{create_router, AppState, PredictionService, RngSource};
use std::sync::Arc;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn post_predict(body: String) -> (StatusCode, Value) {
    let response = test_router(None)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn with(field: &str, value: Value) -> String {
    let mut body = example_body();
    body[field] = value;
    body.to_string()
}

#[tokio::test]
async fn test_example_input_returns_prediction() {
    let (status, json) = post_predict(example_body().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");

    let prediction = &json["prediction"];
    let price = prediction["predictedPrice"].as_i64().unwrap();
    assert!((10_000..=10_000_000).contains(&price));

    let confidence = prediction["confidence"].as_i64().unwrap();
    assert!((60..=95).contains(&confidence));

    let lower = prediction["priceRange"]["lower"].as_i64().unwrap();
    let upper = prediction["priceRange"]["upper"].as_i64().unwrap();
    assert!(lower <= price && price <= upper);

    assert_eq!(
        prediction["pricePerSqFt"].as_i64().unwrap(),
        (price as f64 / 2000.0).round() as i64
    );
    assert_eq!(prediction["trendData"].as_array().unwrap().len(), 12);

    assert_eq!(json["inputSummary"]["squareFeet"], 2000.0);
    assert_eq!(json["inputSummary"]["condition"], "good");
}

#[tokio::test]
async fn test_trend_ends_at_current_month() {
    let (status, json) = post_predict(example_body().to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let trend = json["prediction"]["trendData"].as_array().unwrap();
    let today = Local::now().date_naive().with_day(1).unwrap();
    let expected: Vec<String> = (0..12u32)
        .rev()
        .map(|back| {
            today
                .checked_sub_months(Months::new(back))
                .unwrap()
                .format("%b")
                .to_string()
        })
        .collect();
    let months: Vec<String> = trend
        .iter()
        .map(|p| p["month"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(months, expected);
    assert!(trend.iter().all(|p| p["price"].as_i64().unwrap() > 0));
}

#[tokio::test]
async fn test_invalid_condition_is_client_error() {
    let (status, json) = post_predict(with("condition", json!("luxury"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], "error");
    assert!(json["error"].as_str().unwrap().contains("condition"));
}

#[tokio::test]
async fn test_bedroom_boundaries() {
    for bedrooms in [0, 11] {
        let (status, _) = post_predict(with("bedrooms", json!(bedrooms))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "bedrooms = {}", bedrooms);
    }
    for bedrooms in [1, 10] {
        let (status, _) = post_predict(with("bedrooms", json!(bedrooms))).await;
        assert_eq!(status, StatusCode::OK, "bedrooms = {}", bedrooms);
    }
}

#[tokio::test]
async fn test_missing_field_is_named() {
    let fields = [
        "bedrooms",
        "bathrooms",
        "squareFeet",
        "lotSize",
        "yearBuilt",
        "neighborhood",
        "condition",
        "hasGarage",
        "hasPool",
    ];
    for field in fields {
        let mut body = example_body();
        body.as_object_mut().unwrap().remove(field);

        let (status, json) = post_predict(body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            json["error"].as_str().unwrap().contains(field),
            "error for missing {} was {}",
            field,
            json["error"]
        );
    }
}

#[tokio::test]
async fn test_malformed_bodies_are_client_errors() {
    for body in ["", "not json", "[1, 2, 3]", "42"] {
        let (status, json) = post_predict(body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body = {:?}", body);
        assert_eq!(json["status"], "error");
    }
}

#[tokio::test]
async fn test_unknown_neighborhood_is_accepted() {
    let (status, json) = post_predict(with("neighborhood", json!("riverside"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["inputSummary"]["neighborhood"], "riverside");
}

#[tokio::test]
async fn test_range_invariants_hold_across_inputs() {
    let cases = [
        (1, 1.0, 500.0, 0.1, 1900, "suburbanSouth", "poor", false, false),
        (10, 10.0, 10_000.0, 5.0, 2024, "downtown", "excellent", true, true),
        (4, 2.5, 3200.0, 1.2, 1975, "uptown", "fair", true, false),
    ];

    for (bed, bath, sqft, lot, year, hood, cond, garage, pool) in cases {
        let body = json!({
            "bedrooms": bed,
            "bathrooms": bath,
            "squareFeet": sqft,
            "lotSize": lot,
            "yearBuilt": year,
            "neighborhood": hood,
            "condition": cond,
            "hasGarage": garage,
            "hasPool": pool
        });
        let (status, json) = post_predict(body.to_string()).await;
        assert_eq!(status, StatusCode::OK);

        let p = &json["prediction"];
        let price = p["predictedPrice"].as_i64().unwrap();
        let confidence = p["confidence"].as_i64().unwrap();
        assert!((10_000..=10_000_000).contains(&price));
        assert!((60..=95).contains(&confidence));
        assert!(p["priceRange"]["lower"].as_i64().unwrap() <= price);
        assert!(price <= p["priceRange"]["upper"].as_i64().unwrap());
    }
}

#[tokio::test]
async fn test_seeded_service_is_reproducible() {
    let request = || {
        Request::builder()
            .method("POST")
            .uri("/predict")
            .header("content-type", "application/json")
            .body(Body::from(example_body().to_string()))
            .unwrap()
    };

    let router = test_router(Some(99));
    let a = router.clone().oneshot(request()).await.unwrap();
    let b = router.oneshot(request()).await.unwrap();

    let a = a.into_body().collect().await.unwrap().to_bytes();
    let b = b.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_health_reports_model_loaded() {
    let response = test_router(None)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json, json!({"status": "healthy", "model_loaded": true}));
}

struct FixedRegressor {
    price: f64,
    n_features: usize,
}

impl Regressor for FixedRegressor {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, _features: &[f64]) -> f64 {
        self.price
    }
}

#[tokio::test]
async fn test_implausible_price_is_server_error() {
    let artifact = shared_artifact();
    let features = artifact.features().clone();
    let regressor = FixedRegressor {
        price: 5_000.0,
        n_features: features.n_features(),
    };
    let service = PredictionService::new(Arc::new(regressor), features, RngSource::Seeded(1));
    let router = create_router(AppState::new(service));

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header("content-type", "application/json")
                .body(Body::from(example_body().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        json,
        json!({"status": "error", "error": "Error processing prediction request"})
    );
    assert!(!String::from_utf8_lossy(&bytes).contains("5000"));
}
