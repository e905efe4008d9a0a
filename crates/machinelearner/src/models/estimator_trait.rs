use ndarray::{Array1, Array2};

use crate::error::DelegationError;
use crate::metrics;
use crate::params::{ensure_empty, Params};

/// Whether an estimator predicts continuous values or class labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimatorKind {
    Regressor,
    Classifier,
}

impl std::fmt::Display for EstimatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimatorKind::Regressor => write!(f, "regressor"),
            EstimatorKind::Classifier => write!(f, "classifier"),
        }
    }
}

/// The contract every wrapped model satisfies. Implementations forward each
/// call to the backing crate; they do not validate shapes themselves.
pub trait Estimator: Send {
    /// Name the estimator was registered under.
    fn name(&self) -> &str;

    fn kind(&self) -> EstimatorKind;

    /// Fit on rows of `x` against targets `y`. `extra` carries fit-time
    /// keyword arguments such as `sample_weight`.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, extra: &Params) -> Result<(), DelegationError>;

    fn predict(&self, x: &Array2<f64>, extra: &Params) -> Result<Array1<f64>, DelegationError>;

    /// Default score: R² for regressors, mean accuracy for classifiers.
    fn score(&self, x: &Array2<f64>, y: &Array1<f64>, extra: &Params) -> Result<f64, DelegationError> {
        ensure_empty(self.name(), extra)?;
        let predictions = self.predict(x, &Params::new())?;
        let score = match self.kind() {
            EstimatorKind::Regressor => metrics::r2_score(y, &predictions),
            EstimatorKind::Classifier => metrics::accuracy_score(y, &predictions),
        };
        score.map_err(|e| DelegationError::backend(self.name(), "score", e))
    }
}

/// Constructor stored in a namespace: builds an unfitted estimator from
/// keyword parameters.
pub type Factory = fn(&Params) -> Result<Box<dyn Estimator>, DelegationError>;
