//! Random Forest классификатор

#![allow(non_snake_case)]

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::{PipelineError, Result};
use crate::models::tree::DecisionTree;

/// Ансамбль деревьев CART на бутстрэп-выборках.
///
/// | Параметр            | По умолчанию        |
/// |---------------------|---------------------|
/// | `max_features`      | `sqrt(n_features)`  |
/// | `max_depth`         | без ограничения     |
/// | `min_samples_split` | 2                   |
/// | `min_samples_leaf`  | 1                   |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    n_trees: usize,
    max_features: Option<usize>,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    seed: u64,
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
    is_trained: bool,
}

impl RandomForest {
    pub fn new(n_trees: usize, seed: u64) -> Self {
        Self {
            n_trees,
            max_features: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed,
            trees: Vec::new(),
            n_features: 0,
            n_classes: 0,
            is_trained: false,
        }
    }

    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[instrument(skip_all, fields(n_trees = self.n_trees, n_samples = X.nrows()))]
    pub fn fit(&mut self, X: &Array2<f64>, y: &[usize]) -> Result<()> {
        let n_samples = X.nrows();
        let n_features = X.ncols();

        if n_samples == 0 || n_features == 0 {
            return Err(PipelineError::EmptyDataset {
                context: "random forest fit".to_string(),
            });
        }
        if y.len() != n_samples {
            return Err(PipelineError::FeatureMismatch {
                expected: n_samples,
                got: y.len(),
            });
        }
        if self.n_trees == 0 {
            return Err(PipelineError::InvalidConfig {
                reason: "n_trees must be at least 1".to_string(),
            });
        }

        let n_classes = (y.iter().max().copied().unwrap_or(0) + 1).max(2);
        let max_features = self
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().floor() as usize)
            .clamp(1, n_features);

        info!(
            n_trees = self.n_trees,
            n_samples,
            n_features,
            max_features,
            "training random forest"
        );

        // Сиды деревьев берутся из главного генератора
        let mut master_rng = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(self.n_trees);

        for _ in 0..self.n_trees {
            let tree_seed: u64 = master_rng.gen();
            let mut rng = StdRng::seed_from_u64(tree_seed);
            let bootstrap: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();

            let mut tree = DecisionTree::new(max_features, rng.gen())
                .with_max_depth(self.max_depth)
                .with_min_samples_split(self.min_samples_split)
                .with_min_samples_leaf(self.min_samples_leaf);
            tree.fit(X, y, &bootstrap, n_classes)?;
            trees.push(tree);
        }

        debug!(
            total_nodes = trees.iter().map(|t| t.n_nodes()).sum::<usize>(),
            "forest built"
        );

        self.trees = trees;
        self.n_features = n_features;
        self.n_classes = n_classes;
        self.is_trained = true;
        Ok(())
    }

    fn check_input(&self, X: &Array2<f64>) -> Result<()> {
        if !self.is_trained {
            return Err(PipelineError::NotFitted {
                component: "RandomForest",
            });
        }
        if X.ncols() != self.n_features {
            return Err(PipelineError::FeatureMismatch {
                expected: self.n_features,
                got: X.ncols(),
            });
        }
        Ok(())
    }

    /// Доля голосов деревьев за каждый класс
    pub fn predict_proba(&self, X: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_input(X)?;

        let mut votes = Array2::<f64>::zeros((X.nrows(), self.n_classes));
        for tree in &self.trees {
            for (i, row) in X.rows().into_iter().enumerate() {
                votes[[i, tree.predict_row(row)?]] += 1.0;
            }
        }
        votes /= self.trees.len() as f64;
        Ok(votes)
    }

    /// Голосование большинством; при равенстве побеждает меньший индекс класса
    pub fn predict(&self, X: &Array2<f64>) -> Result<Vec<usize>> {
        let proba = self.predict_proba(X)?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                for (c, &p) in row.iter().enumerate() {
                    if p > row[best] {
                        best = c;
                    }
                }
                best
            })
            .collect())
    }

    /// Важность признаков по уменьшению неоднородности.
    ///
    /// Усредняет нормированные важности деревьев (деревья из одного листа
    /// пропускаются) и нормирует результат к сумме 1.
    pub fn feature_importances(&self) -> Result<Vec<f64>> {
        if !self.is_trained {
            return Err(PipelineError::NotFitted {
                component: "RandomForest",
            });
        }

        let informative: Vec<Vec<f64>> = self
            .trees
            .iter()
            .filter(|t| t.n_nodes() > 1)
            .map(|t| t.feature_importances())
            .collect();

        let mut totals = vec![0.0; self.n_features];
        if informative.is_empty() {
            return Ok(totals);
        }
        for importances in &informative {
            for (total, value) in totals.iter_mut().zip(importances) {
                *total += value;
            }
        }

        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        Ok(totals)
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    /// Два информативных признака и два шумовых
    fn make_classification(n: usize) -> (Array2<f64>, Vec<usize>) {
        let mut rng = StdRng::seed_from_u64(42);
        let mut X = Array2::zeros((n, 4));
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            let class = i % 2;
            y.push(class);
            X[[i, 0]] = class as f64 * 3.0 + rng.gen::<f64>();
            X[[i, 1]] = class as f64 * -2.0 + rng.gen::<f64>();
            X[[i, 2]] = rng.gen::<f64>();
            X[[i, 3]] = rng.gen::<f64>();
        }
        (X, y)
    }

    #[test]
    fn learns_separable_classes() {
        let (X, y) = make_classification(200);
        let mut forest = RandomForest::new(25, 142);
        forest.fit(&X, &y).unwrap();

        let predictions = forest.predict(&X).unwrap();
        let correct = predictions.iter().zip(&y).filter(|(p, t)| p == t).count();
        assert!(correct as f64 / y.len() as f64 > 0.95);
    }

    #[test]
    fn importances_are_normalized_and_non_negative() {
        let (X, y) = make_classification(200);
        let mut forest = RandomForest::new(20, 7);
        forest.fit(&X, &y).unwrap();

        let importances = forest.feature_importances().unwrap();
        assert_eq!(importances.len(), 4);
        assert!(importances.iter().all(|&v| v >= 0.0));
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(importances[0] + importances[1] > importances[2] + importances[3]);
    }

    #[test]
    fn same_seed_same_model() {
        let (X, y) = make_classification(100);
        let mut a = RandomForest::new(10, 3);
        let mut b = RandomForest::new(10, 3);
        a.fit(&X, &y).unwrap();
        b.fit(&X, &y).unwrap();
        assert_eq!(a.feature_importances().unwrap(), b.feature_importances().unwrap());
        assert_eq!(a.predict_proba(&X).unwrap(), b.predict_proba(&X).unwrap());
    }

    #[test]
    fn proba_rows_sum_to_one() {
        let (X, y) = make_classification(60);
        let mut forest = RandomForest::new(9, 1);
        forest.fit(&X, &y).unwrap();
        let proba = forest.predict_proba(&X).unwrap();
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn depth_limit_builds_stumps() {
        let (X, y) = make_classification(100);
        let mut forest = RandomForest::new(8, 5)
            .with_max_features(Some(4))
            .with_max_depth(Some(1));
        forest.fit(&X, &y).unwrap();

        assert_eq!(forest.n_trees(), 8);
        assert!(forest.trees.iter().all(|t| t.n_nodes() <= 3));
        // с полным набором признаков пень выбирает информативный признак
        let importances = forest.feature_importances().unwrap();
        assert!(importances[0] + importances[1] > 0.99);
    }

    #[test]
    fn rejects_wrong_width() {
        let (X, y) = make_classification(20);
        let mut forest = RandomForest::new(3, 1);
        forest.fit(&X, &y).unwrap();
        let narrow = Array2::zeros((2, 3));
        assert!(matches!(
            forest.predict(&narrow),
            Err(PipelineError::FeatureMismatch { expected: 4, got: 3 })
        ));
    }
}
