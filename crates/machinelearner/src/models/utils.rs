use ndarray::{Array1, Array2};

use crate::error::DelegationError;

/// Maps arbitrary (finite) float labels onto `0..n_classes` and back.
///
/// Classes are stored in ascending order, so class index 0 is always the
/// smallest label seen during `fit`.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEncoder {
    classes: Vec<f64>,
}

impl LabelEncoder {
    pub fn fit(estimator: &str, y: &Array1<f64>) -> Result<Self, DelegationError> {
        if let Some(bad) = y.iter().find(|v| !v.is_finite()) {
            return Err(DelegationError::backend(
                estimator,
                "fit",
                format!("labels must be finite, found {}", bad),
            ));
        }
        let mut classes: Vec<f64> = y.to_vec();
        classes.sort_by(|a, b| a.total_cmp(b));
        classes.dedup();
        Ok(Self { classes })
    }

    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Encode labels seen during `fit`; unseen labels are an error.
    pub fn transform(&self, estimator: &str, y: &Array1<f64>) -> Result<Array1<usize>, DelegationError> {
        y.iter()
            .map(|v| {
                self.classes
                    .binary_search_by(|c| c.total_cmp(v))
                    .map_err(|_| {
                        DelegationError::backend(estimator, "fit", format!("unknown label {}", v))
                    })
            })
            .collect::<Result<Vec<usize>, _>>()
            .map(Array1::from_vec)
    }

    pub fn inverse_transform(&self, encoded: &Array1<usize>) -> Array1<f64> {
        encoded.mapv(|idx| self.classes[idx])
    }
}

/// Require at least `min` distinct classes (and at most `max` when given).
pub fn check_n_classes(
    estimator: &str,
    encoder: &LabelEncoder,
    min: usize,
    max: Option<usize>,
) -> Result<(), DelegationError> {
    let n = encoder.n_classes();
    if n < min || max.map_or(false, |m| n > m) {
        let expected = match max {
            Some(m) if m == min => format!("exactly {}", m),
            Some(m) => format!("between {} and {}", min, m),
            None => format!("at least {}", min),
        };
        return Err(DelegationError::backend(
            estimator,
            "fit",
            format!("expected {} classes in the target, got {}", expected, n),
        ));
    }
    Ok(())
}

/// Features and targets must describe the same number of samples.
pub fn check_n_samples(estimator: &str, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), DelegationError> {
    if x.nrows() != y.len() {
        return Err(DelegationError::backend(
            estimator,
            "fit",
            format!(
                "found input variables with inconsistent numbers of samples: [{}, {}]",
                x.nrows(),
                y.len()
            ),
        ));
    }
    Ok(())
}

/// Validate a `sample_weight` argument against the number of samples.
pub fn sample_weights(
    estimator: &str,
    weights: Option<&[f64]>,
    n_samples: usize,
) -> Result<Option<Vec<f64>>, DelegationError> {
    match weights {
        None => Ok(None),
        Some(w) if w.len() != n_samples => Err(DelegationError::invalid(
            estimator,
            "sample_weight",
            format!("expected {} weights, got {}", n_samples, w.len()),
        )),
        Some(w) => Ok(Some(w.to_vec())),
    }
}
