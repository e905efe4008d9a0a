//! Default scoring metrics reported by `score`: R² for regressors and mean
//! accuracy for classifiers.
use linfa::metrics::SingleTargetRegression;
use ndarray::Array1;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricError {
    #[error("found input variables with inconsistent numbers of samples: [{0}, {1}]")]
    LengthMismatch(usize, usize),

    #[error("metric is undefined for empty input")]
    Empty,

    #[error(transparent)]
    Linfa(#[from] linfa::Error),
}

fn check_lengths(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<(), MetricError> {
    if y_true.len() != y_pred.len() {
        return Err(MetricError::LengthMismatch(y_true.len(), y_pred.len()));
    }
    if y_true.is_empty() {
        return Err(MetricError::Empty);
    }
    Ok(())
}

/// Coefficient of determination of `y_pred` against `y_true`.
///
/// A constant `y_true` has no variance to explain: exact predictions score
/// 1.0 and anything else 0.0.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64, MetricError> {
    check_lengths(y_true, y_pred)?;
    let first = y_true[0];
    if y_true.iter().all(|&v| v == first) {
        return Ok(if y_true == y_pred { 1.0 } else { 0.0 });
    }
    Ok(y_pred.r2(y_true)?)
}

/// Fraction of predictions exactly equal to the true label.
pub fn accuracy_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64, MetricError> {
    check_lengths(y_true, y_pred)?;
    let hits = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    Ok(hits as f64 / y_true.len() as f64)
}
