pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::http::{create_router, AppState};
pub use adapters::storage::LocalStorage;
pub use app::provider::BundleModelProvider;
pub use app::trainer::{train_model, TrainingOptions};
pub use config::toml_config::TomlConfig;
pub use core::artifact::ModelArtifact;
pub use core::prediction::{PredictionService, RngSource};
pub use utils::error::{PredictorError, Result};
