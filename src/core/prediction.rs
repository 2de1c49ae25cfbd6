use crate::core::artifact::ModelArtifact;
use crate::core::confidence::{
    confidence_score, price_is_sane, price_range, PRICE_CEILING, PRICE_FLOOR,
};
use crate::core::preprocess::FeaturePipeline;
use crate::core::trend::synthesize_trend;
use crate::domain::model::{HouseInput, PredictionResult};
use crate::domain::ports::Regressor;
use crate::utils::error::{PredictorError, Result};
use chrono::{Local, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Where per-request randomness comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RngSource {
    Entropy,
    /// 每個請求都用同一個種子，結果可重現
    Seeded(u64),
}

impl RngSource {
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or(Self::Entropy, Self::Seeded)
    }

    pub fn rng(&self) -> StdRng {
        match self {
            Self::Entropy => StdRng::from_entropy(),
            Self::Seeded(seed) => StdRng::seed_from_u64(*seed),
        }
    }
}

pub struct PredictionService {
    regressor: Arc<dyn Regressor>,
    features: FeaturePipeline,
    rng_source: RngSource,
}

impl PredictionService {
    pub fn new(regressor: Arc<dyn Regressor>, features: FeaturePipeline, rng_source: RngSource) -> Self {
        Self {
            regressor,
            features,
            rng_source,
        }
    }

    pub fn from_artifact(artifact: ModelArtifact, rng_source: RngSource) -> Self {
        let (model, features) = artifact.into_parts();
        Self::new(Arc::new(model), features, rng_source)
    }

    pub fn is_model_loaded(&self) -> bool {
        self.regressor.n_features() > 0
    }

    pub fn predict(&self, input: &HouseInput) -> Result<PredictionResult> {
        let mut rng = self.rng_source.rng();
        self.predict_with(input, Local::now().date_naive(), &mut rng)
    }

    /// 指定參考日期與亂數來源，方便測試
    pub fn predict_with<R: Rng>(
        &self,
        input: &HouseInput,
        today: NaiveDate,
        rng: &mut R,
    ) -> Result<PredictionResult> {
        let price = self.estimate(input)?;

        let confidence = confidence_score(input, price);
        let price_range = price_range(price, confidence);
        let trend_data = synthesize_trend(price, today, rng);

        Ok(PredictionResult {
            predicted_price: price.round() as i64,
            confidence,
            price_range,
            price_per_sq_ft: (price / input.square_feet).round() as i64,
            trend_data,
        })
    }

    /// Raw point estimate, rejected when it falls outside the sane range.
    pub fn estimate(&self, input: &HouseInput) -> Result<f64> {
        let features = self.features.transform(&input.feature_row())?;

        if features.len() != self.regressor.n_features() {
            return Err(PredictorError::PreprocessingError {
                message: format!(
                    "Transformed {} features but the model expects {}",
                    features.len(),
                    self.regressor.n_features()
                ),
            });
        }

        let price = self.regressor.predict_row(&features);
        tracing::debug!("Raw model estimate: {:.2}", price);

        if !price_is_sane(price) {
            return Err(PredictorError::PredictionOutOfRangeError {
                price,
                min: PRICE_FLOOR,
                max: PRICE_CEILING,
            });
        }
        Ok(price)
    }
}
