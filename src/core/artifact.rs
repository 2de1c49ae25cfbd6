use crate::core::forest::RandomForestRegressor;
use crate::core::preprocess::{FeaturePipeline, OneHotEncoder, StandardScaler};
pub use crate::domain::model::TrainingReport;
use crate::domain::ports::Regressor;
use crate::utils::error::{PredictorError, Result};
use serde::{Deserialize, Serialize};

/// Fitted regressor together with the preprocessing it was trained behind.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    model: RandomForestRegressor,
    features: FeaturePipeline,
    metadata: Option<TrainingReport>,
}

/// On-disk layout of the persisted bundle.
#[derive(Serialize, Deserialize)]
struct Bundle {
    model: RandomForestRegressor,
    encoder: OneHotEncoder,
    scaler: StandardScaler,
    cat_cols: Vec<String>,
    num_cols: Vec<String>,
    #[serde(default)]
    metadata: Option<TrainingReport>,
}

impl ModelArtifact {
    pub fn new(
        model: RandomForestRegressor,
        features: FeaturePipeline,
        metadata: Option<TrainingReport>,
    ) -> Result<Self> {
        if model.n_features() != features.n_features() {
            return Err(PredictorError::ModelError {
                message: format!(
                    "Model expects {} features but the preprocessing produces {}",
                    model.n_features(),
                    features.n_features()
                ),
            });
        }
        Ok(Self {
            model,
            features,
            metadata,
        })
    }

    pub fn model(&self) -> &RandomForestRegressor {
        &self.model
    }

    pub fn features(&self) -> &FeaturePipeline {
        &self.features
    }

    pub fn metadata(&self) -> Option<&TrainingReport> {
        self.metadata.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_fitted()
    }

    pub fn into_parts(self) -> (RandomForestRegressor, FeaturePipeline) {
        (self.model, self.features)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let bundle = Bundle {
            model: self.model.clone(),
            encoder: self.features.encoder.clone(),
            scaler: self.features.scaler.clone(),
            cat_cols: self.features.cat_cols.clone(),
            num_cols: self.features.num_cols.clone(),
            metadata: self.metadata.clone(),
        };
        Ok(serde_json::to_vec(&bundle)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let bundle: Bundle = serde_json::from_slice(data)?;
        bundle.model.check_structure()?;
        let features =
            FeaturePipeline::new(bundle.encoder, bundle.scaler, bundle.cat_cols, bundle.num_cols)?;
        Self::new(bundle.model, features, bundle.metadata)
    }
}
