use crate::config::{validate_provider, DEFAULT_HOST, DEFAULT_MODEL_PATH, DEFAULT_PORT};
use crate::core::ConfigProvider;
use crate::domain::model::{ForestParams, TrainingOptions};
use crate::utils::error::{PredictorError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub prediction: PredictionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: String,
    pub training_samples: usize,
    pub seed: u64,
    pub test_fraction: f64,
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub max_features: Option<usize>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let training = TrainingOptions::default();
        Self {
            path: DEFAULT_MODEL_PATH.to_string(),
            training_samples: training.n_samples,
            seed: training.seed,
            test_fraction: training.test_fraction,
            n_estimators: training.forest.n_estimators,
            max_depth: training.forest.max_depth,
            min_samples_leaf: training.forest.min_samples_leaf,
            max_features: training.forest.max_features,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PredictorError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PredictorError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PORT})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        Self::substitute_vars(content, |name| std::env::var(name).ok())
    }

    fn substitute_vars<F>(content: &str, lookup: F) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PredictorError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            lookup(var_name).unwrap_or_else(|| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 命令列參數優先於檔案設定
    #[cfg(feature = "cli")]
    pub fn apply_cli_overrides(&mut self, cli: &crate::config::CliConfig) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(path) = &cli.model_path {
            self.model.path = path.clone();
        }
        if let Some(seed) = cli.seed {
            self.prediction.seed = Some(seed);
        }
        if cli.json_logs {
            self.logging.json = true;
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn host(&self) -> &str {
        &self.server.host
    }

    fn port(&self) -> u16 {
        self.server.port
    }

    fn model_path(&self) -> &str {
        &self.model.path
    }

    fn training_options(&self) -> TrainingOptions {
        TrainingOptions {
            n_samples: self.model.training_samples,
            seed: self.model.seed,
            test_fraction: self.model.test_fraction,
            forest: ForestParams {
                n_estimators: self.model.n_estimators,
                max_depth: self.model.max_depth,
                min_samples_leaf: self.model.min_samples_leaf,
                max_features: self.model.max_features,
                ..Default::default()
            },
        }
    }

    fn prediction_seed(&self) -> Option<u64> {
        self.prediction.seed
    }

    fn json_logs(&self) -> bool {
        self.logging.json
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
