//! Ручная балансировка классов подвыборкой

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

use crate::data::RawTable;
use crate::error::{PipelineError, Result};
use crate::types::{ClassCounts, Label};

/// Берёт `sample_size` строк каждого класса (без возвращения) и перемешивает результат.
///
/// Каждый шаг использует свой генератор с одним и тем же seed, поэтому
/// повторный запуск на тех же данных даёт ту же последовательность строк.
pub struct ClassBalancer {
    sample_size: usize,
    seed: u64,
}

impl ClassBalancer {
    pub fn new(sample_size: usize, seed: u64) -> Self {
        Self { sample_size, seed }
    }

    pub fn balance(&self, table: &RawTable, target: &str) -> Result<RawTable> {
        let target_idx = table.column_index(target)?;

        let mut positives = Vec::new();
        let mut negatives = Vec::new();
        for i in 0..table.len() {
            match table.cell(i, target_idx).and_then(Label::parse) {
                Some(Label::Positive) => positives.push(i),
                Some(Label::Negative) => negatives.push(i),
                None => {}
            }
        }

        let sampled_pos = self.sample(&positives, Label::Positive)?;
        let sampled_neg = self.sample(&negatives, Label::Negative)?;

        let mut combined: Vec<usize> = sampled_pos.into_iter().chain(sampled_neg).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        combined.shuffle(&mut rng);

        let counts = ClassCounts {
            negative: self.sample_size,
            positive: self.sample_size,
        };
        info!(
            positive = counts.positive,
            negative = counts.negative,
            "classes balanced"
        );

        Ok(table.take_rows(&combined))
    }

    fn sample(&self, rows: &[usize], label: Label) -> Result<Vec<usize>> {
        if self.sample_size > rows.len() {
            return Err(PipelineError::UndersizedClass {
                label,
                requested: self.sample_size,
                available: rows.len(),
            });
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        Ok(rows
            .choose_multiple(&mut rng, self.sample_size)
            .copied()
            .collect())
    }
}

/// Подсчёт меток в таблице (строки без метки не учитываются)
pub fn count_labels(table: &RawTable, target: &str) -> Result<ClassCounts> {
    let target_idx = table.column_index(target)?;
    let mut counts = ClassCounts {
        negative: 0,
        positive: 0,
    };
    for i in 0..table.len() {
        match table.cell(i, target_idx).and_then(Label::parse) {
            Some(Label::Positive) => counts.positive += 1,
            Some(Label::Negative) => counts.negative += 1,
            None => {}
        }
    }
    Ok(counts)
}
