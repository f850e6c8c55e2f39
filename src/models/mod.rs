/// ML модели

pub mod forest;
pub mod pipeline;
pub mod smote;
pub mod tree;

pub use forest::RandomForest;
pub use pipeline::{FittedPipeline, TrainingPipeline};
pub use smote::Smote;
pub use tree::DecisionTree;
