use crate::app::dataset::generate_synthetic_data;
use crate::core::artifact::ModelArtifact;
use crate::core::forest::RandomForestRegressor;
use crate::core::preprocess::FeaturePipeline;
pub use crate::domain::model::TrainingOptions;
use crate::domain::model::{HouseSample, TrainingReport};
use crate::utils::error::{PredictorError, Result};
use crate::utils::validation::{validate_positive_number, validate_range, Validate};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::time::Instant;

pub const CATEGORICAL_COLUMNS: [&str; 2] = ["neighborhood", "condition"];
pub const NUMERIC_COLUMNS: [&str; 7] = [
    "bedrooms",
    "bathrooms",
    "square_feet",
    "lot_size",
    "year_built",
    "has_garage",
    "has_pool",
];

impl Validate for TrainingOptions {
    fn validate(&self) -> Result<()> {
        validate_positive_number("model.training_samples", self.n_samples, 10)?;
        validate_positive_number("model.n_estimators", self.forest.n_estimators, 1)?;
        validate_positive_number("model.max_depth", self.forest.max_depth, 1)?;
        validate_positive_number("model.min_samples_leaf", self.forest.min_samples_leaf, 1)?;
        validate_range("model.test_fraction", self.test_fraction, 0.0, 0.9)?;
        Ok(())
    }
}

/// 產生合成資料並訓練新的模型
pub fn train_model(options: &TrainingOptions) -> Result<ModelArtifact> {
    options.validate()?;
    tracing::info!(
        "🏗️ Training new house price model ({} samples, {} trees)",
        options.n_samples,
        options.forest.n_estimators
    );

    let samples = generate_synthetic_data(options.n_samples, options.seed)?;
    train_on_samples(&samples, options)
}

pub fn train_on_samples(samples: &[HouseSample], options: &TrainingOptions) -> Result<ModelArtifact> {
    if samples.len() < 2 {
        return Err(PredictorError::ModelError {
            message: format!("Need at least 2 samples to train, got {}", samples.len()),
        });
    }
    let started = Instant::now();

    let rows: Vec<_> = samples.iter().map(|s| s.input.feature_row()).collect();
    let features = FeaturePipeline::fit(&rows, &CATEGORICAL_COLUMNS, &NUMERIC_COLUMNS)?;
    let x = rows
        .iter()
        .map(|row| features.transform(row))
        .collect::<Result<Vec<_>>>()?;
    let y: Vec<f64> = samples.iter().map(|s| s.price).collect();

    // 以固定種子切分訓練集與測試集
    let mut indices: Vec<usize> = (0..samples.len()).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(options.seed));
    let n_test = ((samples.len() as f64) * options.test_fraction).round() as usize;
    let n_test = n_test.min(samples.len() - 1);
    let (test_idx, train_idx) = indices.split_at(n_test);

    let x_train: Vec<Vec<f64>> = train_idx.iter().map(|&i| x[i].clone()).collect();
    let y_train: Vec<f64> = train_idx.iter().map(|&i| y[i]).collect();
    let model = RandomForestRegressor::fit(&x_train, &y_train, options.forest, options.seed)?;

    let predictions: Vec<f64> = test_idx.iter().map(|&i| model.predict(&x[i])).collect();
    let actual: Vec<f64> = test_idx.iter().map(|&i| y[i]).collect();
    let (r2, mae, rmse) = evaluate(&actual, &predictions);

    let report = TrainingReport {
        n_train: train_idx.len(),
        n_test: test_idx.len(),
        r2,
        mae,
        rmse,
        trained_at: Utc::now(),
    };

    tracing::info!(
        "✅ Model trained in {:?} - R²: {:.3}, MAE: {:.0}, RMSE: {:.0} ({} train / {} test)",
        started.elapsed(),
        report.r2,
        report.mae,
        report.rmse,
        report.n_train,
        report.n_test
    );

    ModelArtifact::new(model, features, Some(report))
}

/// R², MAE and RMSE; all zero for an empty test set.
pub fn evaluate(actual: &[f64], predicted: &[f64]) -> (f64, f64, f64) {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return (0.0, 0.0, 0.0);
    }

    let mean = actual[..n].iter().sum::<f64>() / n as f64;
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    let mut abs_err = 0.0;
    for (a, p) in actual.iter().zip(predicted).take(n) {
        ss_res += (a - p).powi(2);
        ss_tot += (a - mean).powi(2);
        abs_err += (a - p).abs();
    }

    let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };
    (r2, abs_err / n as f64, (ss_res / n as f64).sqrt())
}
