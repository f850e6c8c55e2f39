//! Поколоночный препроцессор
//!
//! Порядок выходных колонок фиксирован группами: порядковые, one-hot,
//! масштабированные непрерывные, бинарные (без преобразования). Именно в
//! этом порядке их ждёт классификатор, входной порядок колонок роли не играет.

use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::FeatureSchema;
use crate::data::FeatureFrame;
use crate::error::{PipelineError, Result};
use crate::preprocessing::{OneHotEncoder, OrdinalEncoder, StandardScaler};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnTransformer {
    ordinal: OrdinalEncoder,
    one_hot: OneHotEncoder,
    scaler: StandardScaler,
    continuous: Vec<String>,
    passthrough: Vec<String>,
    is_fitted: bool,
}

impl ColumnTransformer {
    pub fn new(schema: &FeatureSchema) -> Self {
        Self {
            ordinal: OrdinalEncoder::new(schema.ordinal.clone()),
            one_hot: OneHotEncoder::new(schema.nominal.clone()),
            scaler: StandardScaler::new(),
            continuous: schema.continuous.clone(),
            passthrough: schema.binary.clone(),
            is_fitted: false,
        }
    }

    /// Обучение только на train-части
    pub fn fit(&mut self, frame: &FeatureFrame) -> Result<()> {
        if frame.is_empty() {
            return Err(PipelineError::EmptyDataset {
                context: "column transformer fit".to_string(),
            });
        }
        self.ordinal.fit(frame)?;
        self.one_hot.fit(frame)?;
        self.scaler.fit(&numeric_block(frame, &self.continuous)?)?;
        self.is_fitted = true;

        debug!(n_features_out = self.n_features_out(), "column transformer fitted");
        Ok(())
    }

    pub fn transform(&self, frame: &FeatureFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PipelineError::NotFitted {
                component: "ColumnTransformer",
            });
        }

        let blocks = [
            self.ordinal.transform(frame)?,
            self.one_hot.transform(frame)?,
            self.scaler.transform(&numeric_block(frame, &self.continuous)?)?,
            numeric_block(frame, &self.passthrough)?,
        ];

        let width: usize = blocks.iter().map(|b| b.ncols()).sum();
        let mut out = Array2::zeros((frame.len(), width));
        let mut offset = 0;
        for block in &blocks {
            let end = offset + block.ncols();
            out.slice_mut(s![.., offset..end]).assign(block);
            offset = end;
        }
        Ok(out)
    }

    pub fn fit_transform(&mut self, frame: &FeatureFrame) -> Result<Array2<f64>> {
        self.fit(frame)?;
        self.transform(frame)
    }

    pub fn n_features_out(&self) -> usize {
        self.ordinal.feature_names_out().len()
            + self.one_hot.n_features_out()
            + self.continuous.len()
            + self.passthrough.len()
    }

    /// Итоговые имена признаков в порядке выхода
    pub fn feature_names_out(&self) -> Vec<String> {
        let mut names = self.ordinal.feature_names_out();
        names.extend(self.one_hot.feature_names_out());
        names.extend(self.continuous.iter().cloned());
        names.extend(self.passthrough.iter().cloned());
        names
    }
}

/// Разбор числовых колонок в матрицу
fn numeric_block(frame: &FeatureFrame, columns: &[String]) -> Result<Array2<f64>> {
    let mut block = Array2::zeros((frame.len(), columns.len()));
    for (j, name) in columns.iter().enumerate() {
        for (i, raw) in frame.column(name)?.into_iter().enumerate() {
            let value = raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| PipelineError::NonNumericValue {
                    column: name.clone(),
                    row: i,
                    raw: raw.to_string(),
                })?;
            block[[i, j]] = value;
        }
    }
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema {
            binary: vec!["Smoke".into()],
            ordinal: vec!["Health".into()],
            nominal: vec!["Country".into()],
            continuous: vec!["Age".into()],
            target: "y".into(),
        }
    }

    fn frame(rows: &[[&str; 4]]) -> FeatureFrame {
        FeatureFrame::new(
            vec!["Smoke".into(), "Health".into(), "Country".into(), "Age".into()],
            rows.iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn output_follows_group_order() {
        let train = frame(&[
            ["1", "2", "FR", "30"],
            ["0", "1", "US", "50"],
            ["1", "3", "DE", "40"],
        ]);
        let mut transformer = ColumnTransformer::new(&schema());
        let x = transformer.fit_transform(&train).unwrap();

        assert_eq!(
            transformer.feature_names_out(),
            vec!["Health", "Country_FR", "Country_US", "Age", "Smoke"]
        );
        assert_eq!(x.ncols(), transformer.n_features_out());

        // строка 0: Health=2 -> 1, Country=FR, Age=30 -> -1.2247, Smoke=1
        assert_eq!(x[[0, 0]], 1.0);
        assert_eq!(x[[0, 1]], 1.0);
        assert_eq!(x[[0, 2]], 0.0);
        assert!((x[[0, 3]] + 1.224_744_871).abs() < 1e-6);
        assert_eq!(x[[0, 4]], 1.0);
    }

    #[test]
    fn non_numeric_passthrough_fails() {
        let train = frame(&[["yes", "1", "FR", "30"], ["0", "2", "US", "40"]]);
        let mut transformer = ColumnTransformer::new(&schema());
        let err = transformer.fit_transform(&train).unwrap_err();
        assert!(matches!(err, PipelineError::NonNumericValue { column, .. } if column == "Smoke"));
    }

    #[test]
    fn transform_requires_fit() {
        let transformer = ColumnTransformer::new(&schema());
        let test = frame(&[["1", "1", "FR", "30"]]);
        assert!(matches!(
            transformer.transform(&test),
            Err(PipelineError::NotFitted { .. })
        ));
    }
}
