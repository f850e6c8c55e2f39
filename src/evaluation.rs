//! Оценка качества на отложенной выборке

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::types::Label;

/// `matrix[истинный][предсказанный]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    matrix: Vec<Vec<usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: Label,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl ConfusionMatrix {
    pub fn from_labels(truth: &[Label], predicted: &[Label]) -> Result<Self> {
        if truth.is_empty() {
            return Err(PipelineError::EmptyDataset {
                context: "evaluation split".to_string(),
            });
        }
        if truth.len() != predicted.len() {
            return Err(PipelineError::FeatureMismatch {
                expected: truth.len(),
                got: predicted.len(),
            });
        }

        let n = Label::ALL.len();
        let mut matrix = vec![vec![0usize; n]; n];
        for (t, p) in truth.iter().zip(predicted) {
            matrix[t.index()][p.index()] += 1;
        }
        Ok(Self { matrix })
    }

    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.matrix.len()).map(|i| self.matrix[i][i]).sum();
        match self.total() {
            0 => 0.0,
            total => correct as f64 / total as f64,
        }
    }

    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        let n = self.matrix.len();
        Label::ALL
            .iter()
            .map(|&label| {
                let c = label.index();
                let tp = self.matrix[c][c];
                let predicted: usize = (0..n).map(|i| self.matrix[i][c]).sum();
                let support: usize = self.matrix[c].iter().sum();

                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    label,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.matrix
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Отчёт в духе classification report: по классам, accuracy, macro и weighted средние
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: [f64; 3],
    pub weighted_avg: [f64; 3],
    pub support: usize,
}

impl ClassificationReport {
    pub fn new(truth: &[Label], predicted: &[Label]) -> Result<Self> {
        let cm = ConfusionMatrix::from_labels(truth, predicted)?;
        let classes = cm.class_metrics();
        let support = cm.total();

        let k = classes.len() as f64;
        let mut macro_avg = [0.0; 3];
        let mut weighted_avg = [0.0; 3];
        for m in &classes {
            let w = m.support as f64 / support as f64;
            for (i, v) in [m.precision, m.recall, m.f1].into_iter().enumerate() {
                macro_avg[i] += v / k;
                weighted_avg[i] += v * w;
            }
        }

        Ok(Self {
            classes,
            accuracy: cm.accuracy(),
            macro_avg,
            weighted_avg,
            support,
        })
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12}{:>10}{:>10}{:>10}{:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for m in &self.classes {
            writeln!(
                f,
                "{:>12}{:>10.2}{:>10.2}{:>10.2}{:>10}",
                m.label.to_string(),
                m.precision,
                m.recall,
                m.f1,
                m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12}{:>10}{:>10}{:>10.2}{:>10}",
            "accuracy", "", "", self.accuracy, self.support
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>12}{:>10.2}{:>10.2}{:>10.2}{:>10}",
                name, avg[0], avg[1], avg[2], self.support
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Label::{Negative as N, Positive as P};

    #[test]
    fn known_matrix() {
        let truth = [P, P, P, N, N, N, N, N];
        let predicted = [P, P, N, N, N, N, P, N];
        let cm = ConfusionMatrix::from_labels(&truth, &predicted).unwrap();
        assert_eq!(cm.as_rows(), &[vec![4usize, 1], vec![1usize, 2]]);
        assert!((cm.accuracy() - 6.0 / 8.0).abs() < 1e-12);

        let metrics = cm.class_metrics();
        // Positive: TP=2, FP=1, FN=1
        assert!((metrics[1].precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((metrics[1].recall - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(metrics[1].support, 3);
        // Negative: TP=4, FP=1, FN=1
        assert!((metrics[0].f1 - 0.8).abs() < 1e-12);
    }

    #[test]
    fn no_predicted_positives_gives_zero_precision() {
        let cm = ConfusionMatrix::from_labels(&[P, N], &[N, N]).unwrap();
        let metrics = cm.class_metrics();
        assert_eq!(metrics[1].precision, 0.0);
        assert_eq!(metrics[1].f1, 0.0);
    }

    #[test]
    fn report_averages_and_text() {
        let truth = [P, P, N, N];
        let predicted = [P, N, N, N];
        let report = ClassificationReport::new(&truth, &predicted).unwrap();
        assert!((report.accuracy - 0.75).abs() < 1e-12);
        // precision: N = 2/3, P = 1
        assert!((report.macro_avg[0] - (2.0 / 3.0 + 1.0) / 2.0).abs() < 1e-12);
        assert_eq!(report.support, 4);

        let text = report.to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("accuracy"));
        assert!(text.contains("weighted avg"));
    }

    #[test]
    fn empty_split_fails() {
        assert!(ConfusionMatrix::from_labels(&[], &[]).is_err());
    }
}
