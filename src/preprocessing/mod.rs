/// Модуль предобработки данных

pub mod column_transformer;
pub mod normalization;
pub mod one_hot;
pub mod ordinal;

pub use column_transformer::ColumnTransformer;
pub use normalization::StandardScaler;
pub use one_hot::OneHotEncoder;
pub use ordinal::OrdinalEncoder;
