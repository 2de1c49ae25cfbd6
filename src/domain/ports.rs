use crate::domain::model::TrainingOptions;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn exists(&self, path: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn host(&self) -> &str;
    fn port(&self) -> u16;
    fn model_path(&self) -> &str;
    fn training_options(&self) -> TrainingOptions;
    fn prediction_seed(&self) -> Option<u64>;
    fn json_logs(&self) -> bool;

    fn bind_address(&self) -> String {
        format!("{}:{}", self.host(), self.port())
    }
}

/// 單列特徵向量 → 價格估計
pub trait Regressor: Send + Sync {
    fn n_features(&self) -> usize;
    fn predict_row(&self, features: &[f64]) -> f64;
}

#[async_trait]
pub trait ModelProvider: Send + Sync {
    type Model: Send;

    async fn provide(&self) -> Result<Self::Model>;
}
