//! Cancer Risk ML - обучение классификатора риска рака по данным опроса

pub mod config;
pub mod data;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod persistence;
pub mod preprocessing;
pub mod report;
pub mod training;
pub mod types;

pub use config::{FeatureSchema, OutputPaths, TrainingConfig};
pub use error::{PipelineError, Result};
pub use models::{FittedPipeline, TrainingPipeline};
pub use types::*;

// Re-export для удобства
pub use training::run;
