/// Загрузка, балансировка и подготовка исходных данных

pub mod balance;
pub mod frame;
pub mod loader;
pub mod split;

pub use balance::{count_labels, ClassBalancer};
pub use frame::{select_features, FeatureFrame};
pub use loader::{read_csv, RawTable};
pub use split::train_test_split;
