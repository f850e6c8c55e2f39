//! One-hot кодирование номинальных колонок

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::data::FeatureFrame;
use crate::error::{PipelineError, Result};
use crate::preprocessing::ordinal::sorted_categories;

/// One-hot с отброшенной первой (базовой) категорией.
///
/// Категория, не встречавшаяся при обучении, кодируется нулями во всех
/// индикаторных колонках.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    /// Категории без базовой, по колонкам
    kept: Vec<Vec<String>>,
    is_fitted: bool,
}

impl OneHotEncoder {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            kept: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn fit(&mut self, frame: &FeatureFrame) -> Result<()> {
        let mut kept = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let categories = sorted_categories(&frame.column(name)?);
            kept.push(categories.into_iter().skip(1).collect());
        }
        self.kept = kept;
        self.is_fitted = true;
        Ok(())
    }

    pub fn n_features_out(&self) -> usize {
        self.kept.iter().map(Vec::len).sum()
    }

    pub fn transform(&self, frame: &FeatureFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PipelineError::NotFitted {
                component: "OneHotEncoder",
            });
        }

        let mut encoded = Array2::zeros((frame.len(), self.n_features_out()));
        let mut offset = 0;
        for (name, kept) in self.columns.iter().zip(&self.kept) {
            for (i, value) in frame.column(name)?.into_iter().enumerate() {
                if let Some(pos) = kept.iter().position(|c| c.as_str() == value) {
                    encoded[[i, offset + pos]] = 1.0;
                }
            }
            offset += kept.len();
        }
        Ok(encoded)
    }

    /// Имена вида `<колонка>_<категория>`
    pub fn feature_names_out(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(&self.kept)
            .flat_map(|(name, kept)| kept.iter().map(move |c| format!("{}_{}", name, c)))
            .collect()
    }
}
