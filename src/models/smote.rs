//! SMOTE: синтетическое дополнение миноритарных классов

#![allow(non_snake_case)]

use ndarray::{s, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PipelineError, Result};

/// Применяется только при обучении; на этапе предсказания не участвует.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Smote {
    k_neighbors: usize,
    seed: u64,
}

impl Smote {
    pub fn new(k_neighbors: usize, seed: u64) -> Self {
        Self { k_neighbors, seed }
    }

    /// Дополняет каждый класс до размера мажоритарного.
    /// Синтетические строки добавляются после исходных.
    pub fn fit_resample(&self, X: &Array2<f64>, y: &[usize]) -> Result<(Array2<f64>, Vec<usize>)> {
        if X.nrows() != y.len() {
            return Err(PipelineError::FeatureMismatch {
                expected: X.nrows(),
                got: y.len(),
            });
        }
        if y.is_empty() {
            return Err(PipelineError::EmptyDataset {
                context: "SMOTE input".to_string(),
            });
        }

        let n_classes = y.iter().max().copied().unwrap_or(0) + 1;
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
        for (i, &label) in y.iter().enumerate() {
            members[label].push(i);
        }
        let majority = members.iter().map(Vec::len).max().unwrap_or(0);

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut synthetic: Vec<(Vec<f64>, usize)> = Vec::new();

        for (class, rows) in members.iter().enumerate() {
            let n_needed = majority - rows.len();
            if n_needed == 0 || rows.is_empty() {
                continue;
            }
            if rows.len() < 2 {
                return Err(PipelineError::InsufficientMinority { count: rows.len() });
            }

            let k = self.k_neighbors.min(rows.len() - 1);
            let neighbors = nearest_neighbors(X, rows, k);
            debug!(class, n_needed, k, "generating synthetic samples");

            for _ in 0..n_needed {
                let i = rng.gen_range(0..rows.len());
                let nn = neighbors[i][rng.gen_range(0..k)];
                let gap: f64 = rng.gen();

                let base = X.row(rows[i]);
                let other = X.row(nn);
                let sample: Vec<f64> = base
                    .iter()
                    .zip(other.iter())
                    .map(|(a, b)| a + gap * (b - a))
                    .collect();
                synthetic.push((sample, class));
            }
        }

        let n_original = X.nrows();
        let mut X_res = Array2::zeros((n_original + synthetic.len(), X.ncols()));
        X_res.slice_mut(s![..n_original, ..]).assign(X);
        let mut y_res = y.to_vec();
        for (offset, (sample, class)) in synthetic.into_iter().enumerate() {
            for (j, value) in sample.into_iter().enumerate() {
                X_res[[n_original + offset, j]] = value;
            }
            y_res.push(class);
        }

        info!(
            before = n_original,
            after = y_res.len(),
            "classes oversampled"
        );
        Ok((X_res, y_res))
    }
}

/// Для каждой строки класса: индексы k ближайших соседей того же класса
/// (евклидово расстояние, сама строка исключается)
fn nearest_neighbors(X: &Array2<f64>, rows: &[usize], k: usize) -> Vec<Vec<usize>> {
    rows.iter()
        .map(|&i| {
            let mut distances: Vec<(f64, usize)> = rows
                .iter()
                .filter(|&&j| j != i)
                .map(|&j| {
                    let d: f64 = X
                        .row(i)
                        .iter()
                        .zip(X.row(j).iter())
                        .map(|(a, b)| (a - b).powi(2))
                        .sum();
                    (d, j)
                })
                .collect();
            distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            distances.into_iter().take(k).map(|(_, j)| j).collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn balances_classes() {
        let X = array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [10.0, 10.0], [11.0, 11.0]];
        let y = vec![0, 0, 0, 0, 1, 1];
        let (X_res, y_res) = Smote::new(5, 142).fit_resample(&X, &y).unwrap();

        assert_eq!(X_res.nrows(), 8);
        assert_eq!(y_res.iter().filter(|&&c| c == 1).count(), 4);
        assert_eq!(y_res.iter().filter(|&&c| c == 0).count(), 4);
        // исходные строки сохраняются первыми
        assert_eq!(X_res.slice(s![..6, ..]), X);
    }

    #[test]
    fn synthetic_points_lie_between_neighbors() {
        let X = array![[0.0], [0.0], [0.0], [10.0], [20.0]];
        let y = vec![0, 0, 0, 1, 1];
        let (X_res, _) = Smote::new(5, 1).fit_resample(&X, &y).unwrap();
        let synthetic = X_res[[5, 0]];
        assert!((10.0..=20.0).contains(&synthetic));
    }

    #[test]
    fn balanced_input_is_unchanged() {
        let X = array![[0.0], [1.0], [2.0], [3.0]];
        let y = vec![0, 1, 0, 1];
        let (X_res, y_res) = Smote::new(5, 1).fit_resample(&X, &y).unwrap();
        assert_eq!(X_res, X);
        assert_eq!(y_res, y);
    }

    #[test]
    fn single_minority_sample_fails() {
        let X = array![[0.0], [1.0], [2.0]];
        let y = vec![0, 0, 1];
        assert!(matches!(
            Smote::new(5, 1).fit_resample(&X, &y),
            Err(PipelineError::InsufficientMinority { count: 1 })
        ));
    }
}
