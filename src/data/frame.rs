//! Отбор признаков и удаление строк с пропусками

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::FeatureSchema;
use crate::data::RawTable;
use crate::error::{PipelineError, Result};
use crate::types::Label;

/// Матрица признаков X до кодирования: все ячейки присутствуют.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFrame {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl FeatureFrame {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| PipelineError::MissingColumn {
                column: name.to_string(),
            })?;
        let width = self.columns.len();
        self.rows
            .iter()
            .map(|r| {
                r.get(idx).map(String::as_str).ok_or(PipelineError::FeatureMismatch {
                    expected: width,
                    got: r.len(),
                })
            })
            .collect()
    }

    /// Строки с заданными индексами; индекс за пределами фрейма даёт ошибку
    pub fn take_rows(&self, indices: &[usize]) -> Result<FeatureFrame> {
        let rows = indices
            .iter()
            .map(|&i| {
                self.rows.get(i).cloned().ok_or(PipelineError::FeatureMismatch {
                    expected: self.rows.len(),
                    got: i,
                })
            })
            .collect::<Result<_>>()?;
        Ok(FeatureFrame {
            columns: self.columns.clone(),
            rows,
        })
    }
}

/// Выбирает колонки схемы (и целевую), отбрасывая строки с любым пропуском
pub fn select_features(table: &RawTable, schema: &FeatureSchema) -> Result<(FeatureFrame, Vec<Label>)> {
    let feature_names = schema.raw_features();
    let feature_idx: Vec<usize> = feature_names
        .iter()
        .map(|name| table.column_index(name))
        .collect::<Result<_>>()?;
    let target_idx = table.column_index(&schema.target)?;

    let mut rows = Vec::with_capacity(table.len());
    let mut labels = Vec::with_capacity(table.len());
    let mut dropped = 0usize;

    'rows: for i in 0..table.len() {
        let label = match table.cell(i, target_idx).and_then(Label::parse) {
            Some(label) => label,
            None => {
                dropped += 1;
                continue;
            }
        };

        let mut row = Vec::with_capacity(feature_idx.len());
        for &col in &feature_idx {
            match table.cell(i, col) {
                Some(value) => row.push(value.to_string()),
                None => {
                    dropped += 1;
                    continue 'rows;
                }
            }
        }
        rows.push(row);
        labels.push(label);
    }

    debug!(dropped, "rows with missing values removed");
    info!(rows = rows.len(), features = feature_names.len(), "features selected");

    Ok((FeatureFrame::new(feature_names, rows), labels))
}
