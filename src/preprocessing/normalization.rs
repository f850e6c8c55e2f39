//! Нормализация данных (z-score)

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Стандартизация по колонкам: (x - mean) / std.
/// Статистики считаются только на обучающей выборке.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Option<Array1<f64>>,
    std: Option<Array1<f64>>,
    is_fitted: bool,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            mean: None,
            std: None,
            is_fitted: false,
        }
    }

    pub fn fit(&mut self, X: &Array2<f64>) -> Result<()> {
        if X.nrows() == 0 {
            return Err(PipelineError::EmptyDataset {
                context: "scaler fit".to_string(),
            });
        }

        self.mean = X.mean_axis(Axis(0));
        // Популяционное стандартное отклонение (ddof = 0)
        let mut std = X.std_axis(Axis(0), 0.0);

        // Избегаем деления на ноль
        for val in std.iter_mut() {
            if *val < 1e-10 {
                *val = 1.0;
            }
        }
        self.std = Some(std);

        self.is_fitted = true;
        Ok(())
    }

    pub fn transform(&self, X: &Array2<f64>) -> Result<Array2<f64>> {
        let not_fitted = || PipelineError::NotFitted {
            component: "StandardScaler",
        };
        if !self.is_fitted {
            return Err(not_fitted());
        }

        let mean = self.mean.as_ref().ok_or_else(not_fitted)?;
        let std = self.std.as_ref().ok_or_else(not_fitted)?;

        if X.ncols() != mean.len() {
            return Err(PipelineError::FeatureMismatch {
                expected: mean.len(),
                got: X.ncols(),
            });
        }

        let mut normalized = X.clone();
        for mut row in normalized.rows_mut() {
            for (i, val) in row.iter_mut().enumerate() {
                *val = (*val - mean[i]) / std[i];
            }
        }

        Ok(normalized)
    }

    pub fn fit_transform(&mut self, X: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(X)?;
        self.transform(X)
    }
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn zero_mean_unit_variance() {
        let X = array![[1.0, 10.0], [2.0, 10.0], [3.0, 10.0]];
        let mut scaler = StandardScaler::new();
        let Z = scaler.fit_transform(&X).unwrap();

        let col0 = Z.column(0);
        assert!(col0.sum().abs() < 1e-12);
        let var = col0.mapv(|v| v * v).sum() / 3.0;
        assert!((var - 1.0).abs() < 1e-12);

        // постоянная колонка: std заменяется на 1, значения становятся нулями
        assert!(Z.column(1).iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn transform_uses_training_statistics() {
        let mut scaler = StandardScaler::new();
        scaler.fit(&array![[0.0], [2.0]]).unwrap();
        let Z = scaler.transform(&array![[4.0]]).unwrap();
        assert!((Z[[0, 0]] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn transform_before_fit_fails() {
        let scaler = StandardScaler::new();
        assert!(matches!(
            scaler.transform(&array![[1.0]]),
            Err(PipelineError::NotFitted { .. })
        ));
    }
}
