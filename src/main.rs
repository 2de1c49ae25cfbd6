use anyhow::Context;
use clap::Parser;
use house_price_service::core::{ConfigProvider, ModelProvider};
use house_price_service::utils::{logger, validation::Validate};
use house_price_service::{
    AppState, BundleModelProvider, CliConfig, LocalStorage, PredictionService, RngSource,
    TomlConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    match cli.config.clone() {
        Some(path) => {
            // 載入 TOML 配置
            let mut config = match TomlConfig::from_file(&path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 {}", e.recovery_suggestion());
                    std::process::exit(1);
                }
            };
            config.apply_cli_overrides(&cli);
            run(config, cli.verbose).await
        }
        None => {
            let verbose = cli.verbose;
            run(cli, verbose).await
        }
    }
}

async fn run<C: ConfigProvider + Validate>(config: C, verbose: bool) -> anyhow::Result<()> {
    logger::init_logger(verbose, config.json_logs());
    tracing::info!("Starting house-price-service");

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    // 沒有可用模型就不提供服務
    let provider = BundleModelProvider::new(
        LocalStorage::new("."),
        config.model_path(),
        config.training_options(),
    );
    let artifact = match provider.provide().await {
        Ok(artifact) => artifact,
        Err(e) => {
            tracing::error!(
                "❌ Could not load or train the model: {} (Category: {:?})",
                e,
                e.category()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e);
            std::process::exit(3);
        }
    };

    let rng_source = RngSource::from_seed(config.prediction_seed());
    if let RngSource::Seeded(seed) = rng_source {
        tracing::info!("🎲 Using fixed prediction seed {}", seed);
    }
    let state = AppState::new(PredictionService::from_artifact(artifact, rng_source));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;

    house_price_service::adapters::http::serve(listener, state)
        .await
        .context("server error")?;

    Ok(())
}
