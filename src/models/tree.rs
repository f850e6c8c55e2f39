//! Дерево решений CART (классификация, критерий Джини)

#![allow(non_snake_case)]

use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        class: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity_left: f64,
    impurity_right: f64,
    n_left: usize,
    score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    max_features: usize,
    seed: u64,
    n_classes: usize,
    root: Option<TreeNode>,
    /// Суммарное уменьшение неоднородности по признакам (не нормировано)
    impurity_decrease: Vec<f64>,
    n_nodes: usize,
}

pub fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

impl DecisionTree {
    pub fn new(max_features: usize, seed: u64) -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: max_features.max(1),
            seed,
            n_classes: 0,
            root: None,
            impurity_decrease: Vec::new(),
            n_nodes: 0,
        }
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split.max(2);
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf.max(1);
        self
    }

    /// Обучение на подвыборке `indices` (при бутстрэпе индексы повторяются)
    pub fn fit(&mut self, X: &Array2<f64>, y: &[usize], indices: &[usize], n_classes: usize) -> Result<()> {
        if indices.is_empty() || X.ncols() == 0 {
            return Err(PipelineError::EmptyDataset {
                context: "decision tree fit".to_string(),
            });
        }

        self.n_classes = n_classes;
        self.impurity_decrease = vec![0.0; X.ncols()];
        self.n_nodes = 0;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let root = self.build_tree(X, y, indices, 0, &mut rng);
        self.root = Some(root);
        Ok(())
    }

    fn build_tree(
        &mut self,
        X: &Array2<f64>,
        y: &[usize],
        indices: &[usize],
        depth: usize,
        rng: &mut StdRng,
    ) -> TreeNode {
        self.n_nodes += 1;

        let n = indices.len();
        let mut counts = vec![0usize; self.n_classes];
        for &i in indices {
            counts[y[i]] += 1;
        }
        let impurity = gini(&counts, n);

        let depth_exceeded = self.max_depth.is_some_and(|d| depth >= d);
        if depth_exceeded || n < self.min_samples_split || impurity == 0.0 {
            return make_leaf(&counts);
        }

        let best = match self.find_split(X, y, indices, rng) {
            Some(best) => best,
            None => return make_leaf(&counts),
        };

        let n_left = best.n_left;
        let n_right = n - n_left;
        self.impurity_decrease[best.feature] += n as f64 * impurity
            - n_left as f64 * best.impurity_left
            - n_right as f64 * best.impurity_right;

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| X[[i, best.feature]] <= best.threshold);

        TreeNode::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.build_tree(X, y, &left_indices, depth + 1, rng)),
            right: Box::new(self.build_tree(X, y, &right_indices, depth + 1, rng)),
        }
    }

    /// Перебор случайного подмножества признаков; постоянные признаки
    /// не засчитываются в `max_features`
    fn find_split(&self, X: &Array2<f64>, y: &[usize], indices: &[usize], rng: &mut StdRng) -> Option<BestSplit> {
        let n = indices.len();
        let mut features: Vec<usize> = (0..X.ncols()).collect();
        features.shuffle(rng);

        let mut best: Option<BestSplit> = None;
        let mut visited = 0;

        for feature in features {
            if visited >= self.max_features {
                break;
            }

            let mut pairs: Vec<(f64, usize)> = indices.iter().map(|&i| (X[[i, feature]], y[i])).collect();
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            if pairs[0].0 == pairs[n - 1].0 {
                continue;
            }
            visited += 1;

            let mut left = vec![0usize; self.n_classes];
            let mut right = vec![0usize; self.n_classes];
            for &(_, label) in &pairs {
                right[label] += 1;
            }

            for pos in 0..n - 1 {
                let label = pairs[pos].1;
                left[label] += 1;
                right[label] -= 1;

                if pairs[pos].0 == pairs[pos + 1].0 {
                    continue;
                }
                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }

                let impurity_left = gini(&left, n_left);
                let impurity_right = gini(&right, n_right);
                let score = (n_left as f64 * impurity_left + n_right as f64 * impurity_right) / n as f64;

                if best.as_ref().map_or(true, |b| score < b.score) {
                    let (lo, hi) = (pairs[pos].0, pairs[pos + 1].0);
                    let mut threshold = lo / 2.0 + hi / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(BestSplit {
                        feature,
                        threshold,
                        impurity_left,
                        impurity_right,
                        n_left,
                        score,
                    });
                }
            }
        }

        best
    }

    pub fn predict_row(&self, sample: ArrayView1<f64>) -> Result<usize> {
        let mut node = self.root.as_ref().ok_or(PipelineError::NotFitted {
            component: "DecisionTree",
        })?;
        loop {
            match node {
                TreeNode::Leaf { class } => return Ok(*class),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if sample[*feature] <= *threshold { &**left } else { &**right };
                }
            }
        }
    }

    /// Нормированная важность признаков дерева (сумма = 1, либо нули для листа)
    pub fn feature_importances(&self) -> Vec<f64> {
        let total: f64 = self.impurity_decrease.iter().sum();
        if total > 0.0 {
            self.impurity_decrease.iter().map(|v| v / total).collect()
        } else {
            vec![0.0; self.impurity_decrease.len()]
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }
}

fn make_leaf(counts: &[usize]) -> TreeNode {
    // При равенстве выигрывает меньший индекс класса
    let mut class = 0;
    for (c, &count) in counts.iter().enumerate() {
        if count > counts[class] {
            class = c;
        }
    }

    TreeNode::Leaf { class }
}
