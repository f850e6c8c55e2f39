/// Типы данных для пайплайна обучения

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    Negative,
    Positive,
}

impl Label {
    pub const ALL: [Label; 2] = [Label::Negative, Label::Positive];

    /// Разбор ячейки целевой переменной: "1", "1.0" -> Positive, "0", "0.0" -> Negative
    pub fn parse(raw: &str) -> Option<Self> {
        let value: f64 = raw.trim().parse().ok()?;
        if value == 1.0 {
            Some(Label::Positive)
        } else if value == 0.0 {
            Some(Label::Negative)
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        match self {
            Label::Negative => 0,
            Label::Positive => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Label::Negative),
            1 => Some(Label::Positive),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Строка таблицы важности признаков (колонки `Variable`, `Importance`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    #[serde(rename = "Variable")]
    pub variable: String,
    #[serde(rename = "Importance")]
    pub importance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassCounts {
    pub negative: usize,
    pub positive: usize,
}

/// Итог одного запуска обучения
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub balanced_counts: ClassCounts,
    pub rows_after_cleaning: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub accuracy: f64,
    pub n_features_out: usize,
    pub pipeline_path: PathBuf,
    pub importances_path: Option<PathBuf>, // None, если важности не удалось посчитать
    pub feature_names_path: PathBuf,
}
