//! Сохранение артефактов обучения
//!
//! Три файла для приложения: бинарный пайплайн (bincode в версионированной
//! обёртке), CSV важностей `Variable,Importance` и список итоговых признаков
//! по одному на строку.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{PipelineError, Result};
use crate::models::FittedPipeline;
use crate::types::FeatureImportance;

/// Текущая версия бинарного формата
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    format_version: u32,
    trained_at: DateTime<Utc>,
    target: &'a str,
    feature_names: &'a [String],
    pipeline: &'a FittedPipeline,
}

#[derive(Deserialize)]
struct Envelope {
    format_version: u32,
    trained_at: DateTime<Utc>,
    target: String,
    feature_names: Vec<String>,
    pipeline: FittedPipeline,
}

/// Сведения о сохранённой модели
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    pub target: String,
    pub feature_names: Vec<String>,
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PipelineError::Write {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

impl FittedPipeline {
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn save(&self, path: &Path, target: &str) -> Result<()> {
        let envelope = EnvelopeRef {
            format_version: FORMAT_VERSION,
            trained_at: Utc::now(),
            target,
            feature_names: self.feature_names(),
            pipeline: self,
        };
        let bytes = bincode::serialize(&envelope).map_err(|e| PipelineError::Serialize { source: e })?;

        ensure_parent_dir(path)?;
        fs::write(path, &bytes).map_err(|e| PipelineError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(size_bytes = bytes.len(), "pipeline saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_metadata(path).map(|(pipeline, _)| pipeline)
    }

    /// Загрузка с проверкой версии формата
    pub fn load_with_metadata(path: &Path) -> Result<(Self, ArtifactMetadata)> {
        let bytes = fs::read(path).map_err(|e| PipelineError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let envelope: Envelope = bincode::deserialize(&bytes).map_err(|e| PipelineError::Deserialize {
            path: path.to_path_buf(),
            source: e,
        })?;

        if envelope.format_version != FORMAT_VERSION {
            return Err(PipelineError::IncompatibleFormat {
                path: path.to_path_buf(),
                expected: FORMAT_VERSION,
                found: envelope.format_version,
            });
        }

        let metadata = ArtifactMetadata {
            format_version: envelope.format_version,
            trained_at: envelope.trained_at,
            target: envelope.target,
            feature_names: envelope.feature_names,
        };
        Ok((envelope.pipeline, metadata))
    }
}

#[instrument(skip(table), fields(path = %path.display(), rows = table.len()))]
pub fn write_importances(path: &Path, table: &[FeatureImportance]) -> Result<()> {
    ensure_parent_dir(path)?;
    let csv_err = |e: csv::Error| PipelineError::CsvWrite {
        path: path.to_path_buf(),
        source: e,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for row in table {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush().map_err(|e| PipelineError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;

    info!("feature importances saved");
    Ok(())
}

pub fn read_importances(path: &Path) -> Result<Vec<FeatureImportance>> {
    let csv_err = |e: csv::Error| PipelineError::CsvParse {
        path: path.to_path_buf(),
        source: e,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    reader
        .deserialize()
        .map(|row| row.map_err(csv_err))
        .collect()
}

/// Один признак на строку, с завершающим переводом строки
#[instrument(skip(names), fields(path = %path.display(), n = names.len()))]
pub fn write_feature_names(path: &Path, names: &[String]) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut content = String::new();
    for name in names {
        content.push_str(name);
        content.push('\n');
    }
    fs::write(path, content).map_err(|e| PipelineError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;

    info!("final feature names saved");
    Ok(())
}

pub fn read_feature_names(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| PipelineError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(content.lines().map(|l| l.to_string()).collect())
}
