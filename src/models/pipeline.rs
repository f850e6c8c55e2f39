//! Пайплайн: препроцессор -> SMOTE -> Random Forest
//!
//! `TrainingPipeline` обучается один раз и превращается в неизменяемый
//! `FittedPipeline`, который сохраняется на диск и используется приложением.

#![allow(non_snake_case)]

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::TrainingConfig;
use crate::data::FeatureFrame;
use crate::error::{PipelineError, Result};
use crate::models::{RandomForest, Smote};
use crate::preprocessing::ColumnTransformer;
use crate::types::Label;

pub struct TrainingPipeline {
    preprocessor: ColumnTransformer,
    oversampler: Smote,
    classifier: RandomForest,
}

impl TrainingPipeline {
    pub fn new(config: &TrainingConfig) -> Self {
        Self {
            preprocessor: ColumnTransformer::new(&config.schema),
            oversampler: Smote::new(config.k_neighbors, config.seed),
            classifier: RandomForest::new(config.n_trees, config.seed),
        }
    }

    /// Обучение на train-части: препроцессор и SMOTE видят только её
    pub fn fit(mut self, X: &FeatureFrame, y: &[Label]) -> Result<FittedPipeline> {
        if X.len() != y.len() {
            return Err(PipelineError::FeatureMismatch {
                expected: X.len(),
                got: y.len(),
            });
        }

        let encoded = self.preprocessor.fit_transform(X)?;
        let classes: Vec<usize> = y.iter().map(|l| l.index()).collect();

        let (resampled, resampled_y) = self.oversampler.fit_resample(&encoded, &classes)?;
        self.classifier.fit(&resampled, &resampled_y)?;

        let feature_names = self.preprocessor.feature_names_out();
        info!(
            n_features = feature_names.len(),
            n_train = X.len(),
            n_resampled = resampled_y.len(),
            "pipeline fitted"
        );

        Ok(FittedPipeline {
            preprocessor: self.preprocessor,
            oversampler: self.oversampler,
            classifier: self.classifier,
            feature_names,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedPipeline {
    preprocessor: ColumnTransformer,
    /// Хранится ради полноты описания пайплайна, при предсказании пропускается
    oversampler: Smote,
    classifier: RandomForest,
    feature_names: Vec<String>,
}

impl FittedPipeline {
    /// Кодирование сырых признаков тем же (уже обученным) препроцессором
    pub fn transform(&self, X: &FeatureFrame) -> Result<Array2<f64>> {
        self.preprocessor.transform(X)
    }

    pub fn predict(&self, X: &FeatureFrame) -> Result<Vec<Label>> {
        let encoded = self.transform(X)?;
        Ok(self
            .classifier
            .predict(&encoded)?
            .into_iter()
            .map(|c| Label::from_index(c).unwrap_or(Label::Negative))
            .collect())
    }

    /// Вероятности классов (колонки: Negative, Positive)
    pub fn predict_proba(&self, X: &FeatureFrame) -> Result<Array2<f64>> {
        let encoded = self.transform(X)?;
        self.classifier.predict_proba(&encoded)
    }

    /// Порядок признаков на входе классификатора
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_features_in(&self) -> usize {
        self.classifier.n_features()
    }

    pub fn classifier(&self) -> &RandomForest {
        &self.classifier
    }
}
