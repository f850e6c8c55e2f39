//! Обучение модели риска рака: `cancer-risk-train [config.json]`

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use cancer_risk_ml::{PipelineError, TrainingConfig};

fn main() -> anyhow::Result<ExitCode> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => TrainingConfig::from_json_file(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => TrainingConfig::default(),
    };

    match cancer_risk_ml::run(&config) {
        Ok(summary) => {
            tracing::info!(
                accuracy = summary.accuracy,
                features = summary.n_features_out,
                pipeline = %summary.pipeline_path.display(),
                "done"
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(PipelineError::DatasetNotFound { path, source }) => {
            tracing::error!(path = %path.display(), error = %source, "input dataset not found");
            eprintln!("Dataset file not found: {}", path.display());
            Ok(ExitCode::from(1))
        }
        Err(e) => Err(e).context("training run failed"),
    }
}
