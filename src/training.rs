//! Полный запуск обучения: от CSV до сохранённых артефактов

use std::path::PathBuf;

use tracing::{error, info, instrument};

use crate::config::TrainingConfig;
use crate::data::{count_labels, read_csv, select_features, train_test_split, ClassBalancer};
use crate::error::Result;
use crate::evaluation::ClassificationReport;
use crate::models::{FittedPipeline, TrainingPipeline};
use crate::persistence::{write_feature_names, write_importances};
use crate::report::{importance_table, render_top_chart};
use crate::types::{FeatureImportance, TrainingSummary};

#[instrument(skip(config), fields(input = %config.input_path.display()))]
pub fn run(config: &TrainingConfig) -> Result<TrainingSummary> {
    config.validate()?;
    let schema = &config.schema;

    let raw = read_csv(&config.input_path)?;

    let balanced = ClassBalancer::new(config.sample_size, config.seed).balance(&raw, &schema.target)?;
    let balanced_counts = count_labels(&balanced, &schema.target)?;
    println!(
        "Class counts after balancing: 0 -> {}, 1 -> {}",
        balanced_counts.negative, balanced_counts.positive
    );

    let (features, labels) = select_features(&balanced, schema)?;
    let rows_after_cleaning = features.len();

    let (train_idx, test_idx) = train_test_split(features.len(), config.test_size, config.seed)?;
    let x_train = features.take_rows(&train_idx)?;
    let x_test = features.take_rows(&test_idx)?;
    let y_train: Vec<_> = train_idx.iter().map(|&i| labels[i]).collect();
    let y_test: Vec<_> = test_idx.iter().map(|&i| labels[i]).collect();
    info!(train = x_train.len(), test = x_test.len(), "data split");

    let pipeline = TrainingPipeline::new(config).fit(&x_train, &y_train)?;

    let predicted = pipeline.predict(&x_test)?;
    let report = ClassificationReport::new(&y_test, &predicted)?;
    println!("Accuracy: {:.4}", report.accuracy);
    println!("{}", report);

    let importances_path = save_outputs(config, &pipeline, importance_table(&pipeline))?;

    info!(accuracy = report.accuracy, "training run finished");
    Ok(TrainingSummary {
        balanced_counts,
        rows_after_cleaning,
        train_rows: x_train.len(),
        test_rows: x_test.len(),
        accuracy: report.accuracy,
        n_features_out: pipeline.n_features_in(),
        pipeline_path: config.outputs.pipeline.clone(),
        importances_path,
        feature_names_path: config.outputs.feature_names.clone(),
    })
}

/// Диаграмма важностей и запись артефактов.
///
/// Сбой расчёта важностей только логируется: пайплайн и список признаков
/// сохраняются, CSV важностей пропускается. Ошибки записи файлов фатальны.
fn save_outputs(
    config: &TrainingConfig,
    pipeline: &FittedPipeline,
    importances: Result<Vec<FeatureImportance>>,
) -> Result<Option<PathBuf>> {
    let importances = match importances {
        Ok(table) => {
            let title = format!(
                "Top {} Variables (Random Forest - {})",
                config.top_n_chart, config.schema.target
            );
            println!("{}", render_top_chart(&table, config.top_n_chart, &title));
            Some(table)
        }
        Err(e) => {
            error!(error = %e, "failed to compute feature importances");
            None
        }
    };

    pipeline.save(&config.outputs.pipeline, &config.schema.target)?;

    let importances_path = match importances {
        Some(table) => {
            write_importances(&config.outputs.importances, &table)?;
            Some(config.outputs.importances.clone())
        }
        None => None,
    };

    write_feature_names(&config.outputs.feature_names, pipeline.feature_names())?;
    Ok(importances_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FeatureSchema, OutputPaths};
    use crate::data::FeatureFrame;
    use crate::error::PipelineError;
    use crate::types::Label;
    use tempfile::TempDir;

    fn fitted(dir: &std::path::Path) -> (TrainingConfig, FittedPipeline) {
        let config = TrainingConfig {
            n_trees: 5,
            schema: FeatureSchema {
                binary: vec!["Smoke".into()],
                ordinal: vec!["Health".into()],
                nominal: vec!["Sex".into()],
                continuous: vec!["Age".into()],
                target: "y".into(),
            },
            outputs: OutputPaths {
                pipeline: dir.join("rf.bin"),
                importances: dir.join("importances.csv"),
                feature_names: dir.join("features.txt"),
            },
            ..TrainingConfig::default()
        };
        let rows: Vec<Vec<String>> = (0..12)
            .map(|i| {
                vec![
                    (i % 2).to_string(),
                    (1 + i % 3).to_string(),
                    if i < 6 { "Male" } else { "Female" }.to_string(),
                    (30 + i * 3).to_string(),
                ]
            })
            .collect();
        let labels: Vec<Label> = (0..12)
            .map(|i| if i % 2 == 0 { Label::Negative } else { Label::Positive })
            .collect();
        let frame = FeatureFrame::new(
            vec!["Smoke".into(), "Health".into(), "Sex".into(), "Age".into()],
            rows,
        );
        let pipeline = TrainingPipeline::new(&config).fit(&frame, &labels).unwrap();
        (config, pipeline)
    }

    #[test]
    fn importance_failure_still_saves_pipeline_and_features() {
        let dir = TempDir::new().unwrap();
        let (config, pipeline) = fitted(dir.path());

        let failed = Err(PipelineError::NotFitted {
            component: "RandomForest",
        });
        let path = save_outputs(&config, &pipeline, failed).unwrap();

        assert!(path.is_none());
        assert!(config.outputs.pipeline.exists());
        assert!(config.outputs.feature_names.exists());
        assert!(!config.outputs.importances.exists());
    }

    #[test]
    fn importance_write_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let (mut config, pipeline) = fitted(dir.path());
        config.outputs.importances = dir.path().to_path_buf();

        let err = save_outputs(&config, &pipeline, importance_table(&pipeline)).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::CsvWrite { .. } | PipelineError::Write { .. }
        ));
    }
}
