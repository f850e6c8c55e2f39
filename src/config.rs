//! Параметры запуска обучения
//!
//! Все значения по умолчанию совпадают с боевыми параметрами
//! обучения; JSON-файл может переопределить любое поле.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Группы исходных колонок. Порядок внутри групп значим.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSchema {
    pub binary: Vec<String>,
    pub ordinal: Vec<String>,
    pub nominal: Vec<String>,
    pub continuous: Vec<String>,
    pub target: String,
}

impl FeatureSchema {
    /// Колонки X в порядке входного фрейма: binary, ordinal, nominal, continuous
    pub fn raw_features(&self) -> Vec<String> {
        self.binary
            .iter()
            .chain(&self.ordinal)
            .chain(&self.nominal)
            .chain(&self.continuous)
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.binary.is_empty()
            && self.ordinal.is_empty()
            && self.nominal.is_empty()
            && self.continuous.is_empty()
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self {
            binary: names(&[
                "CutSkipMeals2",
                "DiffPayMedBills",
                "SmokeNow",
                "MedConditions_Diabetes",
                "MedConditions_HighBP",
                "MedConditions_HeartCondition",
                "MedConditions_LungDisease",
                "MedConditions_Depression",
                "FamilyEverHadCancer2",
            ]),
            ordinal: names(&[
                "GeneralHealth",
                "HealthLimits_Pain",
                "Nervous",
                "IncomeRanges",
                "Education",
            ]),
            nominal: names(&["Birthcountry", "BirthSex"]),
            continuous: names(&[
                "Fruit2",
                "Vegetables2",
                "TimesStrengthTraining",
                "Drink_nb_PerMonth",
                "ChildrenInHH",
                "TotalHousehold",
                "TimesSunburned",
                "BMI",
                "Age",
                "SleepWeekdayHr",
            ]),
            target: "EverHadCancer".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputPaths {
    pub pipeline: PathBuf,
    pub importances: PathBuf,
    pub feature_names: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            pipeline: PathBuf::from("models/cancer_resample_rf.bin"),
            importances: PathBuf::from("data/importances_cancer_resample_rf.csv"),
            feature_names: PathBuf::from("data/features_cancer_resample_rf.txt"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub input_path: PathBuf,
    /// Размер выборки на каждый класс
    pub sample_size: usize,
    pub seed: u64,
    pub test_size: f64,
    pub n_trees: usize,
    pub k_neighbors: usize,
    pub top_n_chart: usize,
    pub schema: FeatureSchema,
    pub outputs: OutputPaths,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("data/df2.csv"),
            sample_size: 1073,
            seed: 142,
            test_size: 0.2,
            n_trees: 100,
            k_neighbors: 5,
            top_n_chart: 20,
            schema: FeatureSchema::default(),
            outputs: OutputPaths::default(),
        }
    }
}

impl TrainingConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PipelineError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: TrainingConfig =
            serde_json::from_str(&content).map_err(|e| PipelineError::InvalidConfig {
                reason: format!("{}: {}", path.display(), e),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(PipelineError::InvalidConfig {
                reason: reason.to_string(),
            })
        };

        if self.sample_size == 0 {
            return invalid("sample_size must be at least 1");
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return invalid("test_size must be in (0, 1)");
        }
        if self.n_trees == 0 {
            return invalid("n_trees must be at least 1");
        }
        if self.k_neighbors == 0 {
            return invalid("k_neighbors must be at least 1");
        }
        if self.schema.is_empty() {
            return invalid("feature schema has no columns");
        }
        if self.schema.target.is_empty() {
            return invalid("target column name is empty");
        }
        Ok(())
    }
}
