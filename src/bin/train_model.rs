use anyhow::Context;
use clap::Parser;
use house_price_service::app::dataset::{generate_synthetic_data, write_csv};
use house_price_service::core::ConfigProvider;
use house_price_service::utils::{logger, validation::Validate};
use house_price_service::{BundleModelProvider, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "train-model")]
#[command(about = "Train the house price model on synthetic data and write the bundle")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Where to write the model bundle
    #[arg(long)]
    model_path: Option<String>,

    /// Number of synthetic samples to generate
    #[arg(long)]
    samples: Option<usize>,

    /// Number of trees in the forest
    #[arg(long)]
    trees: Option<usize>,

    #[arg(long)]
    max_depth: Option<usize>,

    /// Seed for data generation, train/test split and tree bootstraps
    #[arg(long)]
    seed: Option<u64>,

    /// Also export the generated dataset as CSV
    #[arg(long)]
    export_csv: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let mut config = match &args.config {
        Some(path) => TomlConfig::from_file(path)
            .with_context(|| format!("failed to load config file '{}'", path))?,
        None => TomlConfig::default(),
    };

    // 命令列覆蓋設定
    if let Some(path) = &args.model_path {
        config.model.path = path.clone();
    }
    if let Some(samples) = args.samples {
        config.model.training_samples = samples;
    }
    if let Some(trees) = args.trees {
        config.model.n_estimators = trees;
    }
    if let Some(depth) = args.max_depth {
        config.model.max_depth = depth;
    }
    if let Some(seed) = args.seed {
        config.model.seed = seed;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let options = config.training_options();

    if let Some(csv_path) = &args.export_csv {
        let samples = generate_synthetic_data(options.n_samples, options.seed)?;
        let file = std::fs::File::create(csv_path)
            .with_context(|| format!("failed to create {}", csv_path))?;
        write_csv(&samples, file)?;
        tracing::info!("📁 Exported {} samples to {}", samples.len(), csv_path);
    }

    let provider = BundleModelProvider::new(LocalStorage::new("."), config.model_path(), options);
    let artifact = provider.train_and_save().await?;

    if let Some(report) = artifact.metadata() {
        println!("✅ Model saved to {}", config.model_path());
        println!(
            "   R²: {:.3}  MAE: {:.0}  RMSE: {:.0}  ({} train / {} test)",
            report.r2, report.mae, report.rmse, report.n_train, report.n_test
        );
    }

    Ok(())
}
