use crate::app::trainer::{train_model, TrainingOptions};
use crate::core::artifact::ModelArtifact;
use crate::core::{ModelProvider, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 有模型檔就載入，否則以合成資料訓練並寫回
pub struct BundleModelProvider<S: Storage> {
    storage: S,
    model_path: String,
    options: TrainingOptions,
}

impl<S: Storage> BundleModelProvider<S> {
    pub fn new(storage: S, model_path: impl Into<String>, options: TrainingOptions) -> Self {
        Self {
            storage,
            model_path: model_path.into(),
            options,
        }
    }

    pub async fn load(&self) -> Result<ModelArtifact> {
        tracing::info!("📂 Loading existing model from {}", self.model_path);
        let data = self.storage.read_file(&self.model_path).await?;
        let artifact = ModelArtifact::from_bytes(&data)?;
        if let Some(report) = artifact.metadata() {
            tracing::info!(
                "Model trained at {} (R²: {:.3}, {} samples)",
                report.trained_at,
                report.r2,
                report.n_train + report.n_test
            );
        }
        Ok(artifact)
    }

    pub async fn train_and_save(&self) -> Result<ModelArtifact> {
        let options = self.options;
        // 訓練是 CPU 密集工作，移出 async 執行緒
        let artifact = tokio::task::spawn_blocking(move || train_model(&options))
            .await
            .map_err(|e| crate::utils::error::PredictorError::ModelError {
                message: format!("Training task failed: {}", e),
            })??;

        let data = artifact.to_bytes()?;
        tracing::debug!("Writing model bundle ({} bytes)", data.len());
        self.storage.write_file(&self.model_path, &data).await?;
        tracing::info!("💾 Model trained and saved to {}", self.model_path);
        Ok(artifact)
    }
}

#[async_trait]
impl<S: Storage> ModelProvider for BundleModelProvider<S> {
    type Model = ModelArtifact;

    async fn provide(&self) -> Result<ModelArtifact> {
        if self.storage.exists(&self.model_path).await? {
            self.load().await
        } else {
            self.train_and_save().await
        }
    }
}
