//! Ошибки пайплайна обучения

use std::path::PathBuf;

use crate::types::Label;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Входной CSV отсутствует или не открывается.
    #[error("dataset not found: {path}")]
    DatasetNotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV parse error in {path}")]
    CsvParse { path: PathBuf, source: csv::Error },

    #[error("column '{column}' is missing from the dataset")]
    MissingColumn { column: String },

    #[error("dataset is empty: {context}")]
    EmptyDataset { context: String },

    /// Запрошено больше строк, чем есть в классе.
    #[error("class {label} has only {available} rows, cannot sample {requested}")]
    UndersizedClass {
        label: Label,
        requested: usize,
        available: usize,
    },

    #[error("non-numeric value '{raw}' in column '{column}' (row {row})")]
    NonNumericValue {
        column: String,
        row: usize,
        raw: String,
    },

    #[error("unknown category '{category}' in ordinal column '{column}'")]
    UnknownCategory { column: String, category: String },

    #[error("{component} is not fitted")]
    NotFitted { component: &'static str },

    #[error("feature width mismatch: expected {expected}, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("minority class has {count} samples, need at least 2 for SMOTE")]
    InsufficientMinority { count: usize },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("failed to serialize pipeline")]
    Serialize { source: bincode::Error },

    #[error("failed to deserialize pipeline from {path}")]
    Deserialize { path: PathBuf, source: bincode::Error },

    #[error("incompatible pipeline format in {path}: expected {expected}, found {found}")]
    IncompatibleFormat {
        path: PathBuf,
        expected: u32,
        found: u32,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write CSV {path}")]
    CsvWrite { path: PathBuf, source: csv::Error },

    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}
