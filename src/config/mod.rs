pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::model::TrainingOptions;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_range, Validate};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MODEL_PATH: &str = "model.json";

/// 所有配置來源共用的檢查
pub fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_non_empty_string("server.host", config.host())?;
    validate_range("server.port", config.port(), 1, u16::MAX)?;
    validate_path("model.path", config.model_path())?;
    config.training_options().validate()?;
    Ok(())
}

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;

#[cfg(feature = "cli")]
mod cli_config {
    use super::*;
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
    #[command(name = "house-price-service")]
    #[command(about = "HTTP service predicting house sale prices")]
    pub struct CliConfig {
        /// Path to a TOML configuration file
        #[arg(short, long)]
        pub config: Option<String>,

        /// Address to bind [default: 0.0.0.0]
        #[arg(long)]
        pub host: Option<String>,

        /// Port to listen on [default: 5000]
        #[arg(short, long)]
        pub port: Option<u16>,

        /// Model bundle to load, or to write after training [default: model.json]
        #[arg(long)]
        pub model_path: Option<String>,

        /// Fixed seed for confidence and trend randomness
        #[arg(long)]
        pub seed: Option<u64>,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON")]
        pub json_logs: bool,
    }

    impl ConfigProvider for CliConfig {
        fn host(&self) -> &str {
            self.host.as_deref().unwrap_or(DEFAULT_HOST)
        }

        fn port(&self) -> u16 {
            self.port.unwrap_or(DEFAULT_PORT)
        }

        fn model_path(&self) -> &str {
            self.model_path.as_deref().unwrap_or(DEFAULT_MODEL_PATH)
        }

        fn training_options(&self) -> TrainingOptions {
            TrainingOptions::default()
        }

        fn prediction_seed(&self) -> Option<u64> {
            self.seed
        }

        fn json_logs(&self) -> bool {
            self.json_logs
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_provider(self)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = CliConfig::parse_from(["house-price-service"]);
            assert_eq!(config.bind_address(), "0.0.0.0:5000");
            assert_eq!(config.model_path(), "model.json");
            assert_eq!(config.prediction_seed(), None);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_flags() {
            let config = CliConfig::parse_from([
                "house-price-service",
                "--host",
                "127.0.0.1",
                "--port",
                "8080",
                "--seed",
                "7",
                "--json-logs",
            ]);
            assert_eq!(config.bind_address(), "127.0.0.1:8080");
            assert_eq!(config.prediction_seed(), Some(7));
            assert!(config.json_logs());
        }

        #[test]
        fn test_port_zero_is_invalid() {
            let config = CliConfig::parse_from(["house-price-service", "--port", "0"]);
            assert!(config.validate().is_err());
        }
    }
}
