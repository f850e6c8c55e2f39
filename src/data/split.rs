//! Разделение на train/test

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{PipelineError, Result};

/// Индексы train и test после случайной перестановки.
///
/// Размер test = ceil(test_size * n), оставшиеся строки уходят в train.
pub fn train_test_split(n_samples: usize, test_size: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    let n_test = (test_size * n_samples as f64).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(PipelineError::EmptyDataset {
            context: format!(
                "cannot split {} rows with test_size {}",
                n_samples, test_size
            ),
        });
    }

    let mut permutation: Vec<usize> = (0..n_samples).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    permutation.shuffle(&mut rng);

    let test = permutation[..n_test].to_vec();
    let train = permutation[n_test..].to_vec();
    Ok((train, test))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_is_disjoint_and_complete() {
        let (train, test) = train_test_split(10, 0.2, 142).unwrap();
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);

        let mut all: Vec<usize> = train.iter().chain(&test).copied().collect();
        all.sort();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_size_rounds_up() {
        let (train, test) = train_test_split(11, 0.2, 1).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn deterministic_for_seed() {
        assert_eq!(
            train_test_split(50, 0.2, 9).unwrap(),
            train_test_split(50, 0.2, 9).unwrap()
        );
    }

    #[test]
    fn too_small_to_split() {
        assert!(train_test_split(1, 0.2, 1).is_err());
    }
}
