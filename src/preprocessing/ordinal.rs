//! Порядковое кодирование категорий

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::data::FeatureFrame;
use crate::error::{PipelineError, Result};

/// Отсортированный словарь категорий колонки.
///
/// Если все значения числовые, порядок числовой ("2" < "10"),
/// иначе лексикографический.
pub fn sorted_categories(values: &[&str]) -> Vec<String> {
    let mut categories: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    let numeric = categories.iter().all(|c| c.parse::<f64>().is_ok());

    if numeric {
        categories.sort_by(|a, b| {
            let (x, y) = (a.parse::<f64>().unwrap_or(0.0), b.parse::<f64>().unwrap_or(0.0));
            x.total_cmp(&y).then_with(|| a.cmp(b))
        });
    } else {
        categories.sort();
    }
    categories.dedup();
    categories
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdinalEncoder {
    columns: Vec<String>,
    categories: Vec<Vec<String>>,
    is_fitted: bool,
}

impl OrdinalEncoder {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            categories: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn fit(&mut self, frame: &FeatureFrame) -> Result<()> {
        self.categories = self
            .columns
            .iter()
            .map(|name| frame.column(name).map(|values| sorted_categories(&values)))
            .collect::<Result<_>>()?;
        self.is_fitted = true;
        Ok(())
    }

    /// Неизвестная категория даёт ошибку, словарь закрыт
    pub fn transform(&self, frame: &FeatureFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PipelineError::NotFitted {
                component: "OrdinalEncoder",
            });
        }

        let mut encoded = Array2::zeros((frame.len(), self.columns.len()));
        for (j, (name, categories)) in self.columns.iter().zip(&self.categories).enumerate() {
            for (i, value) in frame.column(name)?.into_iter().enumerate() {
                let code = categories
                    .iter()
                    .position(|c| c.as_str() == value)
                    .ok_or_else(|| PipelineError::UnknownCategory {
                        column: name.clone(),
                        category: value.to_string(),
                    })?;
                encoded[[i, j]] = code as f64;
            }
        }
        Ok(encoded)
    }

    pub fn feature_names_out(&self) -> Vec<String> {
        self.columns.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(values: &[&str]) -> FeatureFrame {
        FeatureFrame::new(
            vec!["Health".into()],
            values.iter().map(|v| vec![v.to_string()]).collect(),
        )
    }

    #[test]
    fn numeric_categories_sort_numerically() {
        assert_eq!(sorted_categories(&["10", "2", "1", "2"]), vec!["1", "2", "10"]);
    }

    #[test]
    fn string_categories_sort_lexicographically() {
        assert_eq!(
            sorted_categories(&["Good", "Excellent", "Fair"]),
            vec!["Excellent", "Fair", "Good"]
        );
    }

    #[test]
    fn encodes_rank() {
        let mut encoder = OrdinalEncoder::new(vec!["Health".into()]);
        encoder.fit(&frame(&["3", "1", "2", "3"])).unwrap();
        let encoded = encoder.transform(&frame(&["1", "3", "2"])).unwrap();
        assert_eq!(encoded.column(0).to_vec(), vec![0.0, 2.0, 1.0]);
    }

    #[test]
    fn unseen_category_is_an_error() {
        let mut encoder = OrdinalEncoder::new(vec!["Health".into()]);
        encoder.fit(&frame(&["1", "2"])).unwrap();
        let err = encoder.transform(&frame(&["5"])).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownCategory { category, .. } if category == "5"));
    }
}
