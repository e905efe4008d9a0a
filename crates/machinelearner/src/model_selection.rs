use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplitError {
    #[error("test_size must be in (0, 1), got {0}")]
    InvalidTestSize(f64),

    #[error("found input variables with inconsistent numbers of samples: [{0}, {1}]")]
    LengthMismatch(usize, usize),

    #[error("splitting {n_samples} samples with test_size={test_size} leaves an empty train or test set")]
    EmptySplit { n_samples: usize, test_size: f64 },
}

/// Train and test partitions as `(x_train, x_test, y_train, y_test)`.
pub type Split = (Array2<f64>, Array2<f64>, Array1<f64>, Array1<f64>);

/// Shuffle rows with a seeded RNG and hold out `test_size` of them.
///
/// The test set gets `ceil(test_size * n_samples)` rows.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    test_size: f64,
    seed: u64,
) -> Result<Split, SplitError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(SplitError::InvalidTestSize(test_size));
    }
    let n_samples = x.nrows();
    if n_samples != y.len() {
        return Err(SplitError::LengthMismatch(n_samples, y.len()));
    }
    let n_test = (test_size * n_samples as f64).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(SplitError::EmptySplit {
            n_samples,
            test_size,
        });
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let (test_idx, train_idx) = indices.split_at(n_test);

    Ok((
        x.select(Axis(0), train_idx),
        x.select(Axis(0), test_idx),
        y.select(Axis(0), train_idx),
        y.select(Axis(0), test_idx),
    ))
}
